use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 貸出ID - 貸出台帳の集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// 書籍ID - 蔵書管理で採番される整数キー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// 会員ID - 学生番号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(i64);

impl MemberId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// 蔵書数
///
/// 不変条件：0 <= available <= total
/// 型の外から不正な組み合わせを作れないように、フィールドは非公開。
/// 貸出・返却による増減は`checkout`/`checkin`でのみ行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CopyCount {
    total: i32,
    available: i32,
}

impl CopyCount {
    /// 新規登録時の蔵書数（全冊貸出可能）
    ///
    /// # エラー
    /// `total`が負の場合は`CopyCountError::NegativeTotal`を返す
    pub fn new(total: i32) -> Result<Self, CopyCountError> {
        if total < 0 {
            return Err(CopyCountError::NegativeTotal);
        }
        Ok(Self {
            total,
            available: total,
        })
    }

    /// 永続化層から復元する
    pub fn restore(total: i32, available: i32) -> Result<Self, CopyCountError> {
        if total < 0 {
            return Err(CopyCountError::NegativeTotal);
        }
        if available < 0 || available > total {
            return Err(CopyCountError::AvailableOutOfRange);
        }
        Ok(Self { total, available })
    }

    pub fn total(&self) -> i32 {
        self.total
    }

    pub fn available(&self) -> i32 {
        self.available
    }

    /// 貸出中の冊数
    pub fn on_loan(&self) -> i32 {
        self.total - self.available
    }

    pub fn has_available(&self) -> bool {
        self.available > 0
    }

    /// 1冊貸し出す
    pub fn checkout(self) -> Result<Self, CopyCountError> {
        if !self.has_available() {
            return Err(CopyCountError::NoneAvailable);
        }
        Ok(Self {
            available: self.available - 1,
            ..self
        })
    }

    /// 1冊返却する
    pub fn checkin(self) -> Result<Self, CopyCountError> {
        if self.available >= self.total {
            return Err(CopyCountError::NoneOnLoan);
        }
        Ok(Self {
            available: self.available + 1,
            ..self
        })
    }
}

/// 蔵書数のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyCountError {
    /// 総冊数が負
    NegativeTotal,
    /// 貸出可能数が0..=totalの範囲外
    AvailableOutOfRange,
    /// 貸出可能な冊数がない
    NoneAvailable,
    /// 貸出中の冊数がない
    NoneOnLoan,
}
