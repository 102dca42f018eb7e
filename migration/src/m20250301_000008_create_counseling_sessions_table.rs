use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CounselingSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CounselingSessions::Id)
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CounselingSessions::Student)
                            .string_len(24)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CounselingSessions::Counselor)
                            .string_len(24)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CounselingSessions::Date)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CounselingSessions::Status)
                            .string_len(16)
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(ColumnDef::new(CounselingSessions::Notes).text())
                    .col(
                        ColumnDef::new(CounselingSessions::CreatedAt)
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
                    .name("idx_counseling_sessions_student")
                    .table(CounselingSessions::Table)
                    .col(CounselingSessions::Student)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_counseling_sessions_counselor")
                    .table(CounselingSessions::Table)
                    .col(CounselingSessions::Counselor)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CounselingSessions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CounselingSessions {
    Table,
    Id,
    Student,
    Counselor,
    Date,
    Status,
    Notes,
    CreatedAt,
}
