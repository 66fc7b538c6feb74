use crate::domain::{Member, MemberId};
use crate::ports::member_store::{MemberStore, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;

use super::InMemoryStore;

#[async_trait]
impl MemberStore for InMemoryStore {
    async fn insert(&self, member: Member) -> Result<bool> {
        let mut state = self.lock()?;
        if state.members.contains_key(&member.member_id) {
            return Ok(false);
        }
        state.members.insert(member.member_id, member);
        Ok(true)
    }

    async fn find(&self, member_id: MemberId) -> Result<Option<Member>> {
        Ok(self.lock()?.members.get(&member_id).cloned())
    }

    fn stream_all(&self) -> BoxStream<'_, Result<Member>> {
        self.snapshot(|state| state.members.values().cloned().collect())
    }
}
