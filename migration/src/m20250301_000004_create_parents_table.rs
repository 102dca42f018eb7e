use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Parents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Parents::Id)
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Parents::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Parents::Pid)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Parents::ParentId).string_len(64).unique_key())
                    .col(ColumnDef::new(Parents::Email).string_len(255))
                    .col(ColumnDef::new(Parents::Phone).string_len(64))
                    .col(ColumnDef::new(Parents::Address).text())
                    .col(ColumnDef::new(Parents::LinkedStudent).string_len(24))
                    .col(ColumnDef::new(Parents::UserId).string_len(24))
                    .col(
                        ColumnDef::new(Parents::CreatedAt)
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
                    .name("idx_parents_linked_student")
                    .table(Parents::Table)
                    .col(Parents::LinkedStudent)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Parents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Parents {
    Table,
    Id,
    Name,
    Pid,
    ParentId,
    Email,
    Phone,
    Address,
    LinkedStudent,
    UserId,
    CreatedAt,
}
