pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_accounts_table;
mod m20250301_000002_create_departments_table;
mod m20250301_000003_create_faculty_table;
mod m20250301_000004_create_parents_table;
mod m20250301_000005_create_students_table;
mod m20250301_000006_create_catalog_tables;
mod m20250301_000007_create_academic_records_tables;
mod m20250301_000008_create_counseling_sessions_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_accounts_table::Migration),
            Box::new(m20250301_000002_create_departments_table::Migration),
            Box::new(m20250301_000003_create_faculty_table::Migration),
            Box::new(m20250301_000004_create_parents_table::Migration),
            Box::new(m20250301_000005_create_students_table::Migration),
            Box::new(m20250301_000006_create_catalog_tables::Migration),
            Box::new(m20250301_000007_create_academic_records_tables::Migration),
            Box::new(m20250301_000008_create_counseling_sessions_table::Migration),
        ]
    }
}
