use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Students::Roll)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Students::Email).string_len(255))
                    .col(ColumnDef::new(Students::Phone).string_len(64))
                    .col(ColumnDef::new(Students::Dob).date())
                    .col(ColumnDef::new(Students::Gender).string_len(16))
                    .col(ColumnDef::new(Students::Address).text())
                    .col(ColumnDef::new(Students::DeptId).string_len(24))
                    .col(ColumnDef::new(Students::ParentId).string_len(24))
                    .col(ColumnDef::new(Students::MentorId).string_len(24))
                    .col(ColumnDef::new(Students::UserId).string_len(24).unique_key())
                    .col(ColumnDef::new(Students::FileName).string_len(255))
                    .col(ColumnDef::new(Students::FileData).text())
                    .col(ColumnDef::new(Students::ExtraJson).text())
                    .col(
                        ColumnDef::new(Students::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 导师视图按院系筛选学生
        manager
            .create_index(
                Index::create()
                    .name("idx_students_dept_id")
                    .table(Students::Table)
                    .col(Students::DeptId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    Name,
    Roll,
    Email,
    Phone,
    Dob,
    Gender,
    Address,
    DeptId,
    ParentId,
    MentorId,
    UserId,
    FileName,
    FileData,
    ExtraJson,
    CreatedAt,
}
