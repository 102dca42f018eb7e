use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attendance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attendance::Id)
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Attendance::StudentRoll)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Attendance::Date).date().not_null())
                    .col(ColumnDef::new(Attendance::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Attendance::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Exams::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Exams::Id)
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Exams::Roll).string_len(64).not_null())
                    .col(ColumnDef::new(Exams::Subject).string_len(255).not_null())
                    .col(ColumnDef::new(Exams::ExamName).string_len(255).not_null())
                    .col(ColumnDef::new(Exams::Marks).double().not_null())
                    .col(
                        ColumnDef::new(Exams::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Fees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Fees::Id)
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Fees::Roll).string_len(64).not_null())
                    .col(ColumnDef::new(Fees::Total).double().not_null().default(0.0))
                    .col(ColumnDef::new(Fees::Paid).double().not_null().default(0.0))
                    .col(
                        ColumnDef::new(Fees::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 三类记录都按学号查询
        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_student_roll")
                    .table(Attendance::Table)
                    .col(Attendance::StudentRoll)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exams_roll")
                    .table(Exams::Table)
                    .col(Exams::Roll)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fees_roll")
                    .table(Fees::Table)
                    .col(Fees::Roll)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Fees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Exams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Attendance::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Attendance {
    Table,
    Id,
    StudentRoll,
    Date,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Exams {
    Table,
    Id,
    Roll,
    Subject,
    ExamName,
    Marks,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Fees {
    Table,
    Id,
    Roll,
    Total,
    Paid,
    CreatedAt,
}
