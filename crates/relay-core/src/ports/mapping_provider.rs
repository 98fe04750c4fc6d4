//! MappingProvider port - entity/command から HTTP action へのマッピング
//!
//! Provider はルールテーブルの「ビュー」に過ぎず、entity の状態は持ちません。
//! 設定ファイルの読み込みは外部の責務です。

/// MappingProvider answers which HTTP call, if any, an entity/command pair maps to.
///
/// # 設計原則
/// - `&self` のみ（object-safe、`Arc<dyn MappingProvider>` で共有）
/// - 複数の provider が同じ entity を claim してよい
/// - 検索は同期・非ブロッキング（dispatch 中に呼ばれるため）
pub trait MappingProvider: Send + Sync {
    /// True if this provider holds any mapping for `entity_name`, whatever the command.
    fn provides_binding_for(&self, entity_name: &str) -> bool;

    /// HTTP method configured for this exact pair.
    fn http_method(&self, entity_name: &str, command: &str) -> Option<String>;

    /// URL configured for this exact pair.
    fn url(&self, entity_name: &str, command: &str) -> Option<String>;
}
