// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 迁移工具入口
///
/// 连接串取自 `DATABASE_URL`，`postgres://` 与 `sqlite:` 均可；
/// 子命令（up / down / status / fresh）由 sea-orm-migration 提供。
#[async_std::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
