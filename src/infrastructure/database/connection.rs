// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::settings::DatabaseSettings;
use crate::domain::repositories::Repository;
use crate::infrastructure::repositories::{PostgresRepository, SqliteRepository};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 支持的数据库后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// 根据连接串的 scheme 判断后端
    pub fn from_url(url: &str) -> Result<Self, DbErr> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DatabaseBackend::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(DatabaseBackend::Sqlite)
        } else {
            Err(DbErr::Custom(format!(
                "Unsupported database url scheme: {}",
                url.split(':').next().unwrap_or_default()
            )))
        }
    }
}

/// 内存 SQLite 每个连接都是一个独立的库，只能使用单连接
fn is_in_memory_sqlite(url: &str) -> bool {
    url.starts_with("sqlite:") && (url.contains(":memory:") || url.contains("mode=memory"))
}

/// 创建数据库连接池
///
/// `run_migrations` 为真时在返回前执行全部迁移。
///
/// # 参数
///
/// * `settings` - 数据库配置
///
/// # 返回值
///
/// * `Ok(DatabaseConnection)` - 数据库连接
/// * `Err(DbErr)` - 连接或迁移过程中出现的错误
pub async fn create_pool(settings: &DatabaseSettings) -> Result<DatabaseConnection, DbErr> {
    DatabaseBackend::from_url(&settings.url)?;

    let mut opt = ConnectOptions::new(settings.url.to_owned());
    let in_memory = is_in_memory_sqlite(&settings.url);

    if in_memory {
        opt.max_connections(1).min_connections(1);
    } else {
        if let Some(max) = settings.max_connections {
            opt.max_connections(max);
        }

        if let Some(min) = settings.min_connections {
            opt.min_connections(min);
        }

        if let Some(idle) = settings.idle_timeout {
            opt.idle_timeout(Duration::from_secs(idle));
        }

        opt.max_lifetime(Duration::from_secs(3600));
    }

    if let Some(timeout) = settings.connect_timeout {
        opt.connect_timeout(Duration::from_secs(timeout));
        opt.acquire_timeout(Duration::from_secs(timeout));
    }

    opt.sqlx_logging(true);

    let db = Database::connect(opt).await?;

    if settings.run_migrations {
        Migrator::up(&db, None).await?;
        info!("Database migrations applied");
    }

    Ok(db)
}

/// 按连接串选择后端并构造仓库
///
/// # 返回值
///
/// * `Ok(Arc<dyn Repository>)` - 连接串对应后端的仓库
/// * `Err(DbErr)` - 连接串不受支持，或连接、迁移失败
pub async fn connect_repository(
    settings: &DatabaseSettings,
) -> Result<Arc<dyn Repository>, DbErr> {
    let db = create_pool(settings).await?;

    let repo: Arc<dyn Repository> = match db.get_database_backend() {
        DbBackend::Postgres => Arc::new(PostgresRepository::new(
            db.get_postgres_connection_pool().clone(),
        )),
        DbBackend::Sqlite => Arc::new(SqliteRepository::new(
            db.get_sqlite_connection_pool().clone(),
        )),
        other => {
            return Err(DbErr::Custom(format!(
                "Unsupported database backend: {:?}",
                other
            )))
        }
    };

    info!(backend = repo.backend_name(), "Repository ready");
    Ok(repo)
}
