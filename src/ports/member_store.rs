use crate::domain::{Member, MemberId};
use async_trait::async_trait;
use futures::stream::BoxStream;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 会員ストアポート
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// 会員を追加する
    ///
    /// 同じStudentIDが既に存在する場合は何も変更せず`false`を返す。
    async fn insert(&self, member: Member) -> Result<bool>;

    /// IDで会員を取得する
    async fn find(&self, member_id: MemberId) -> Result<Option<Member>>;

    /// すべての会員をストリーム配信する（StudentIDの昇順）
    fn stream_all(&self) -> BoxStream<'_, Result<Member>>;
}
