// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::services::RatingService;
use crate::infrastructure::database::connection;
use anyhow::{Context, Result};
use tracing::info;

/// 根据配置组装评分服务
///
/// 连接数据库（按配置执行迁移），选择与连接串匹配的仓库实现，
/// 再用服务配置构造 `RatingService`。
pub async fn build_rating_service(settings: &Settings) -> Result<RatingService> {
    let repo = connection::connect_repository(&settings.database)
        .await
        .context("failed to connect repository")?;

    info!(
        backend = repo.backend_name(),
        operation_timeout_ms = settings.service.operation_timeout_ms,
        "Rating service assembled"
    );
    Ok(RatingService::new(repo, settings.service.clone()))
}
