use crate::domain::{self, Member, MemberId, commands::RegisterMember};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};

use super::ServiceDependencies;
use super::errors::{ApplicationError, Entity, Result};

/// 会員を登録する
///
/// StudentIDが既に登録済みの場合は`DuplicateKey`。
pub async fn register_member(deps: &ServiceDependencies, cmd: RegisterMember) -> Result<Member> {
    let member = domain::member::register_member(cmd)?;

    let inserted = deps
        .member_store
        .insert(member.clone())
        .await
        .map_err(ApplicationError::MemberStoreError)?;

    if !inserted {
        return Err(ApplicationError::DuplicateKey(
            Entity::Member,
            member.member_id.to_string(),
        ));
    }

    tracing::info!(member_id = %member.member_id, "member registered");
    Ok(member)
}

/// IDで会員を取得する
pub async fn find_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<Member> {
    deps.member_store
        .find(member_id)
        .await
        .map_err(ApplicationError::MemberStoreError)?
        .ok_or_else(|| ApplicationError::NotFound(Entity::Member, member_id.to_string()))
}

pub fn list_members(deps: &ServiceDependencies) -> BoxStream<'_, Result<Member>> {
    deps.member_store
        .stream_all()
        .map_err(ApplicationError::MemberStoreError)
        .boxed()
}
