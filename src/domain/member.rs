use serde::Serialize;

use super::{MemberId, ValidationError, book::require_text, commands::RegisterMember};

/// Member集約 - 学生会員
///
/// 登録後は不変。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub member_id: MemberId,
    pub name: String,
    pub department: String,
}

/// 純粋関数：会員を登録する
///
/// ビジネスルール：
/// - 氏名と学科は空でないこと（前後の空白は除去）
pub fn register_member(cmd: RegisterMember) -> Result<Member, ValidationError> {
    Ok(Member {
        member_id: cmd.member_id,
        name: require_text("name", &cmd.name)?,
        department: require_text("department", &cmd.department)?,
    })
}
