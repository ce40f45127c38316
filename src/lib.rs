pub mod adapter;
pub mod domain;
pub mod infrastructure;
pub mod usecase;

/// テスト用の AppState 組み立てとリクエスト生成ヘルパー（統合テストから利用）
pub mod test_support;
