//! # Campus Portal 主程序
//!
//! 默认启动 HTTP 服务；另提供迁移、管理员初始化与关系对账等维护命令

use std::sync::Arc;

use campus_portal::{
    AppContext, Result,
    config::ConfigManager,
    database::{self, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_PASSWORD},
    lerror, linfo,
    logging::{self, LogComponent, LogStage},
    management, relations,
};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "campus-portal", version, about = "Role-based campus management API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 运行迁移并启动 HTTP 服务
    Serve,
    /// 只运行数据库迁移
    Migrate,
    /// 创建或提升管理员账户
    SetupAdmin {
        #[arg(long, default_value = DEFAULT_ADMIN_EMAIL)]
        email: String,
        #[arg(long, default_value = DEFAULT_ADMIN_PASSWORD)]
        password: String,
        #[arg(long, default_value = DEFAULT_ADMIN_NAME)]
        name: String,
    },
    /// 为缺少关联的学生补建家长与导师
    SyncRelations,
    /// 清洗学生记录中的非规范字段
    NormalizeStudents,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli.command.unwrap_or(Command::Serve)).await {
        lerror!(
            "system",
            LogStage::Shutdown,
            LogComponent::Main,
            "command_failed",
            format!("命令执行失败: {e}")
        );
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    let config = ConfigManager::new()?.config();
    logging::init_optimized_logging(Some(&config.logging.level));

    let db = database::init_database(&config.database).await?;
    database::run_migrations(&db).await?;

    match command {
        Command::Serve => {
            database::check_database_status(&db).await?;
            let context = Arc::new(AppContext::new(config, Arc::new(db))?);
            linfo!(
                "system",
                LogStage::Startup,
                LogComponent::Main,
                "service_starting",
                "服务启动"
            );
            management::serve(context).await?;
        }
        Command::Migrate => {
            linfo!(
                "system",
                LogStage::Maintenance,
                LogComponent::Main,
                "migrate_done",
                "迁移已完成"
            );
        }
        Command::SetupAdmin {
            email,
            password,
            name,
        } => {
            let context = AppContext::new(config, Arc::new(db))?;
            let (outcome, admin) = database::ensure_default_admin(
                context.db(),
                &context.passwords,
                &email,
                &password,
                &name,
            )
            .await?;
            println!("{outcome:?}: {} <{}>", admin.name, admin.email);
        }
        Command::SyncRelations => {
            let summary = relations::sync::sync_student_relations(&db).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::NormalizeStudents => {
            let updated = relations::sync::normalize_students(&db).await?;
            println!("normalized {updated} student records");
        }
    }
    Ok(())
}
