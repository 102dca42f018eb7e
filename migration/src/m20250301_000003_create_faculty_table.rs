use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Faculty::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Faculty::Id)
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Faculty::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Faculty::Fid)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Faculty::Email).string_len(255))
                    .col(ColumnDef::new(Faculty::Phone).string_len(64))
                    .col(ColumnDef::new(Faculty::Dob).date())
                    .col(ColumnDef::new(Faculty::Gender).string_len(16))
                    .col(ColumnDef::new(Faculty::Address).text())
                    .col(ColumnDef::new(Faculty::DeptId).string_len(24))
                    .col(ColumnDef::new(Faculty::Salary).double())
                    .col(ColumnDef::new(Faculty::UserId).string_len(24))
                    .col(
                        ColumnDef::new(Faculty::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_faculty_dept_id")
                    .table(Faculty::Table)
                    .col(Faculty::DeptId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_faculty_user_id")
                    .table(Faculty::Table)
                    .col(Faculty::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Faculty::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Faculty {
    Table,
    Id,
    Name,
    Fid,
    Email,
    Phone,
    Dob,
    Gender,
    Address,
    DeptId,
    Salary,
    UserId,
    CreatedAt,
}
