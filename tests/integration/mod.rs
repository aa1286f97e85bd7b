// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 与后端无关的仓库行为检查，PostgreSQL 与 SQLite 跑同一组用例
pub mod conformance;
pub mod helpers;
pub mod rating_service_test;
