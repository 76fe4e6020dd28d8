//! UseCase: 接続の受け入れ（Connection Gate + Room Router）
//!
//! ハンドシェイク時に渡されたクレデンシャルを検証し、解決した ID から
//! 所属グループを決めてブローカーに登録する。検証に失敗した接続は登録しない。

use std::sync::Arc;

use hirewire_shared::time::Clock;

use crate::domain::{AuthError, Connection, GroupBroker, PusherChannel, TokenVerifier};

use super::error::AdmitError;

/// 接続受け入れのユースケース
pub struct AdmitConnectionUseCase {
    verifier: Arc<dyn TokenVerifier>,
    broker: Arc<dyn GroupBroker>,
    clock: Arc<dyn Clock>,
}

impl AdmitConnectionUseCase {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        broker: Arc<dyn GroupBroker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            broker,
            clock,
        }
    }

    /// 接続の受け入れを実行
    ///
    /// # Arguments
    ///
    /// * `credential` - ハンドシェイクで渡されたトークン（無ければ `None`）
    /// * `sender` - この接続へのフレーム送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Connection)` - 登録済みの接続（グループ割り当て済み）
    /// * `Err(AdmitError)` - 認証失敗または登録失敗。再試行はしない
    pub fn execute(
        &self,
        credential: Option<&str>,
        sender: PusherChannel,
    ) -> Result<Connection, AdmitError> {
        let credential = credential
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let identity = self.verifier.verify(credential)?;
        let connection = Connection::open(identity, self.clock.now_millis());
        self.broker.register(connection.clone(), sender)?;

        tracing::debug!(
            connection_id = %connection.id(),
            identity = %connection.identity().key(),
            groups = ?connection.groups().iter().map(ToString::to_string).collect::<Vec<_>>(),
            "Connection admitted"
        );

        Ok(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            BrokerError, GroupName, Identity, IdentityId, IdentityKind, broker::MockGroupBroker,
            verifier::MockTokenVerifier,
        },
        infrastructure::broker::InMemoryGroupBroker,
    };
    use hirewire_shared::time::FixedClock;
    use tokio::sync::mpsc;

    fn verifier_returning(identity: Identity) -> Arc<MockTokenVerifier> {
        let mut verifier = MockTokenVerifier::new();
        verifier
            .expect_verify()
            .returning(move |_| Ok(identity.clone()));
        Arc::new(verifier)
    }

    #[test]
    fn test_admit_user_joins_private_and_all_users() {
        // テスト項目: 有効なユーザートークンで接続すると専用グループと all-users に登録される
        // given (前提条件):
        let broker = Arc::new(InMemoryGroupBroker::new());
        let verifier = verifier_returning(Identity::user(IdentityId::new("u1").unwrap()));
        let usecase =
            AdmitConnectionUseCase::new(verifier, broker.clone(), Arc::new(FixedClock::new(1000)));
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let connection = usecase.execute(Some("token"), tx).unwrap();

        // then (期待する結果):
        assert_eq!(connection.identity().kind(), IdentityKind::User);
        assert_eq!(connection.connected_at(), 1000);
        assert_eq!(broker.connection_count(), 1);
        assert_eq!(broker.member_count(&GroupName::AllUsers), 1);
        assert_eq!(broker.member_count(&GroupName::AllAdmins), 0);
    }

    #[test]
    fn test_admit_without_credential_is_rejected_before_verification() {
        // テスト項目: クレデンシャル無し・空白のみの場合は検証せずに拒否する
        // given (前提条件):
        let mut verifier = MockTokenVerifier::new();
        verifier.expect_verify().never();
        let broker = Arc::new(InMemoryGroupBroker::new());
        let usecase = AdmitConnectionUseCase::new(
            Arc::new(verifier),
            broker.clone(),
            Arc::new(FixedClock::new(0)),
        );

        // when (操作):
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let missing = usecase.execute(None, tx1);
        let blank = usecase.execute(Some("   "), tx2);

        // then (期待する結果):
        assert_eq!(
            missing,
            Err(AdmitError::Unauthorized(AuthError::MissingCredential))
        );
        assert_eq!(
            blank,
            Err(AdmitError::Unauthorized(AuthError::MissingCredential))
        );
        assert_eq!(broker.connection_count(), 0);
    }

    #[test]
    fn test_admit_invalid_credential_is_not_registered() {
        // テスト項目: 検証に失敗した接続はブローカーに登録されない
        // given (前提条件):
        let mut verifier = MockTokenVerifier::new();
        verifier
            .expect_verify()
            .returning(|_| Err(AuthError::Expired));
        let mut broker = MockGroupBroker::new();
        broker.expect_register().never();
        let usecase = AdmitConnectionUseCase::new(
            Arc::new(verifier),
            Arc::new(broker),
            Arc::new(FixedClock::new(0)),
        );
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = usecase.execute(Some("expired-token"), tx);

        // then (期待する結果):
        assert_eq!(result, Err(AdmitError::Unauthorized(AuthError::Expired)));
    }

    #[test]
    fn test_admit_registration_failure_is_reported() {
        // テスト項目: ブローカー登録に失敗した場合は Registration エラーになる
        // given (前提条件):
        let verifier = verifier_returning(Identity::admin(IdentityId::new("a1").unwrap(), false));
        let mut broker = MockGroupBroker::new();
        broker
            .expect_register()
            .returning(|_, _| Err(BrokerError::Unavailable("poisoned".to_string())));
        let usecase = AdmitConnectionUseCase::new(
            verifier,
            Arc::new(broker),
            Arc::new(FixedClock::new(0)),
        );
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = usecase.execute(Some("token"), tx);

        // then (期待する結果):
        assert!(matches!(result, Err(AdmitError::Registration(_))));
    }
}
