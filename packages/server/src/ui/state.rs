//! Shared handler state.

use std::sync::Arc;

use crate::{domain::RoundPusher, scheduler::TableConfig, usecase::GetRoundUseCase};

pub struct AppState {
    /// GetRoundUseCase（ラウンド取得のユースケース）
    pub get_round_usecase: Arc<GetRoundUseCase>,
    /// RoundPusher（イベント配信の抽象化）
    pub pusher: Arc<dyn RoundPusher>,
    /// 配信中のテーブル一覧
    pub tables: Vec<TableConfig>,
}

impl AppState {
    /// Whether `namespace` is one of the configured tables
    pub fn has_table(&self, namespace: &str) -> bool {
        self.tables.iter().any(|table| table.namespace == namespace)
    }
}
