//! Application state and dependency injection.

use std::sync::Arc;

use aiser_core::{Agent, AgentRegistry, KnowledgeBase, KnowledgeBaseRegistry};

use crate::service::{ApiPaths, AuthGate, ChatService, Result, ServiceConfig};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    agents: Arc<AgentRegistry>,
    knowledge_bases: Arc<KnowledgeBaseRegistry>,

    auth_gate: AuthGate,
    chat_service: ChatService,
    api_paths: ApiPaths,
}

impl ServiceState {
    /// Creates a new state from already built registries.
    ///
    /// Every request passes the authentication gate; use
    /// [`ServiceState::with_auth_gate`] to install another one.
    pub fn new(agents: AgentRegistry, knowledge_bases: KnowledgeBaseRegistry) -> Self {
        let agents = Arc::new(agents);

        Self {
            chat_service: ChatService::new(Arc::clone(&agents)),
            agents,
            knowledge_bases: Arc::new(knowledge_bases),
            auth_gate: AuthGate::pass_through(),
            api_paths: ApiPaths::default(),
        }
    }

    /// Initializes application state from configuration.
    ///
    /// Registers the given agents and knowledge bases and creates the
    /// authentication gate for the configured environment. The gate accepts
    /// every registered agent and knowledge base id as a token subject.
    pub async fn from_config(
        config: &ServiceConfig,
        agents: Vec<Arc<dyn Agent>>,
        knowledge_bases: Vec<Arc<dyn KnowledgeBase>>,
    ) -> Result<Self> {
        config.validate()?;

        let agents = AgentRegistry::new("agent", agents)?;
        let knowledge_bases = KnowledgeBaseRegistry::new("knowledge base", knowledge_bases)?;

        let acceptable_subjects: Vec<String> = agents
            .ids()
            .chain(knowledge_bases.ids())
            .map(str::to_owned)
            .collect();
        let auth_gate = config.create_auth_gate(acceptable_subjects).await?;

        tracing::info!(
            environment = %config.server_environment,
            agents = agents.len(),
            knowledge_bases = knowledge_bases.len(),
            "service state initialized"
        );

        Ok(Self::new(agents, knowledge_bases)
            .with_auth_gate(auth_gate)
            .with_api_paths(ApiPaths::from(config)))
    }

    /// Replaces the authentication gate.
    pub fn with_auth_gate(mut self, auth_gate: AuthGate) -> Self {
        self.auth_gate = auth_gate;
        self
    }

    /// Replaces the API path prefixes.
    pub fn with_api_paths(mut self, api_paths: ApiPaths) -> Self {
        self.api_paths = api_paths;
        self
    }

    /// Returns the API path prefixes.
    #[inline]
    pub fn api_paths(&self) -> &ApiPaths {
        &self.api_paths
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(agents: Arc<AgentRegistry>);
impl_di!(knowledge_bases: Arc<KnowledgeBaseRegistry>);

impl_di!(auth_gate: AuthGate);
impl_di!(chat_service: ChatService);
impl_di!(api_paths: ApiPaths);
