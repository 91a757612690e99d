/// 領収書機能
pub mod receipts;
