use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    config::Config,
    db::Cache,
    services::{
        auth::{AuthService, TokenIssuer},
        describe::DescribeService,
        group_watch::GroupWatchService,
        mailer::{MailSender, ResendMailer},
        membership::MembershipService,
        otp::OtpManager,
        quiz::QuizService,
        textgen::{GeminiTextGenerator, TextGenerator},
        watch_history::WatchHistoryService,
    },
    store::{
        memory::{
            MemoryAccountStore, MemoryChallengeStore, MemoryGroupWatchStore, MemoryLedgerStore,
        },
        postgres::{PgAccountStore, PgChallengeStore, PgGroupWatchStore, PgLedgerStore},
        AccountStore, ChallengeStore, GroupWatchStore, LedgerStore,
    },
};

/// The per-entity store handles the workflow services are built over.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub challenges: Arc<dyn ChallengeStore>,
    pub ledger: Arc<dyn LedgerStore>,
    pub group_watch: Arc<dyn GroupWatchStore>,
}

impl Stores {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            accounts: Arc::new(PgAccountStore::new(pool.clone())),
            challenges: Arc::new(PgChallengeStore::new(pool.clone())),
            ledger: Arc::new(PgLedgerStore::new(pool.clone())),
            group_watch: Arc::new(PgGroupWatchStore::new(pool.clone())),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(MemoryAccountStore::default()),
            challenges: Arc::new(MemoryChallengeStore::default()),
            ledger: Arc::new(MemoryLedgerStore::default()),
            group_watch: Arc::new(MemoryGroupWatchStore::default()),
        }
    }
}

/// Shared application state: every component constructed once at startup
/// with its dependencies passed in explicitly.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub otp: Arc<OtpManager>,
    pub membership: Arc<MembershipService>,
    pub watch_history: Arc<WatchHistoryService>,
    pub group_watch: Arc<GroupWatchService>,
    pub describe: Arc<DescribeService>,
    pub quiz: Arc<QuizService>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(
        stores: Stores,
        mailer: Arc<dyn MailSender>,
        textgen: Arc<dyn TextGenerator>,
        cache: Cache,
        tokens: TokenIssuer,
    ) -> Self {
        let tokens = Arc::new(tokens);

        Self {
            auth: Arc::new(AuthService::new(
                stores.accounts.clone(),
                stores.ledger.clone(),
                tokens.clone(),
            )),
            otp: Arc::new(OtpManager::new(
                stores.accounts.clone(),
                stores.challenges.clone(),
                stores.ledger.clone(),
                mailer,
            )),
            membership: Arc::new(MembershipService::new(stores.ledger.clone())),
            watch_history: Arc::new(WatchHistoryService::new(stores.ledger.clone())),
            group_watch: Arc::new(GroupWatchService::new(stores.group_watch.clone())),
            describe: Arc::new(DescribeService::new(textgen.clone(), cache)),
            quiz: Arc::new(QuizService::new(textgen)),
            tokens,
        }
    }

    /// Production wiring: Postgres stores plus the real mail and
    /// text-generation adapters.
    pub fn from_config(
        config: &Config,
        pool: PgPool,
        redis_client: redis::Client,
    ) -> anyhow::Result<Self> {
        let stores = Stores::postgres(&pool);

        let mailer: Arc<dyn MailSender> = Arc::new(ResendMailer::new(
            config.mail_api_key.clone(),
            config.mail_api_url.clone(),
            config.mail_from.clone(),
        )?);
        let textgen: Arc<dyn TextGenerator> = Arc::new(GeminiTextGenerator::new(
            config.text_api_key.clone(),
            config.text_api_url.clone(),
        )?);

        let cache = Cache::new(redis_client);
        let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl_secs);

        Ok(Self::new(stores, mailer, textgen, cache, tokens))
    }
}
