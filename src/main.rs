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

use ratingrs::application::bootstrap;
use ratingrs::config::settings::Settings;
use ratingrs::utils::telemetry;
use tracing::info;
use uuid::Uuid;

/// 主函数
///
/// 加载配置、初始化日志、连接数据库并执行迁移，
/// 最后做一次只读查询确认存储可用后退出。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::new()?;
    telemetry::init_telemetry(&settings.telemetry)?;
    info!("Configuration loaded");

    let service = bootstrap::build_rating_service(&settings).await?;

    // nil service id never has ratings
    let probe = service.get_average_rating(Uuid::nil()).await?;
    info!(total = probe.total_ratings, "Storage check passed");

    Ok(())
}
