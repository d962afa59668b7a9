//! Application state: per-category sections, prompts, settings, the optional
//! backend client, the processing gate and the trending-topic cache.
//!
//! Everything lives in memory; nothing survives a restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::config::{load_agent_config_from_env, AgentConfig, Prompts, Settings};
use crate::domain::{Category, TestSection};
use crate::openai::OpenAI;

/// Single slot shared by every generative operation: Idle or Pending.
#[derive(Debug, Default)]
pub struct ProcessingGate {
    pending: AtomicBool,
}

/// Holding a permit means the gate is Pending. Dropping it returns to Idle.
#[derive(Debug)]
pub struct GatePermit<'a> {
    gate: &'a ProcessingGate,
}

impl ProcessingGate {
    /// Idle → Pending. None when another operation already holds the gate.
    pub fn try_acquire(&self) -> Option<GatePermit<'_>> {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GatePermit { gate: self })
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.gate.pending.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    pub settings: Settings,
    pub sections: Arc<RwLock<HashMap<Category, TestSection>>>,
    pub gate: Arc<ProcessingGate>,
    /// Trending topics, kept after the first non-empty fetch.
    pub trends: Arc<RwLock<Vec<String>>>,
}

impl AppState {
    /// Build state from env: load config, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_agent_config_from_env().unwrap_or_default();
        let openai = OpenAI::from_env(&cfg.settings);
        if let Some(oa) = &openai {
            info!(target: "testsmith", base_url = %oa.base_url, fast_model = %oa.fast_model, strong_model = %oa.strong_model, "OpenAI enabled.");
        } else {
            info!(target: "testsmith", "OpenAI disabled (no OPENAI_API_KEY). Generation returns empty results.");
        }
        Self::with_config(cfg, openai)
    }

    /// Build state from explicit parts; used by `new` and by tests.
    pub fn with_config(cfg: AgentConfig, openai: Option<OpenAI>) -> Self {
        let sections = Category::ALL
            .into_iter()
            .map(|c| (c, TestSection::empty(c)))
            .collect::<HashMap<_, _>>();
        Self {
            openai,
            prompts: cfg.prompts,
            settings: cfg.settings,
            sections: Arc::new(RwLock::new(sections)),
            gate: Arc::new(ProcessingGate::default()),
            trends: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn section(&self, category: Category) -> TestSection {
        self.sections
            .read()
            .await
            .get(&category)
            .cloned()
            .unwrap_or_else(|| TestSection::empty(category))
    }

    /// Sections in tab order.
    pub async fn all_sections(&self) -> Vec<TestSection> {
        let map = self.sections.read().await;
        Category::ALL
            .into_iter()
            .map(|c| map.get(&c).cloned().unwrap_or_else(|| TestSection::empty(c)))
            .collect()
    }

    /// Replace a section whole.
    #[instrument(level = "debug", skip(self, content), fields(%category, content_len = content.len()))]
    pub async fn store_section(&self, category: Category, content: String) -> TestSection {
        let section = TestSection {
            content,
            is_generated: true,
            ..TestSection::empty(category)
        };
        self.sections.write().await.insert(category, section.clone());
        debug!(target: "testsmith", %category, "section replaced");
        section
    }

    pub async fn reset_sections(&self) {
        let mut map = self.sections.write().await;
        for c in Category::ALL {
            map.insert(c, TestSection::empty(c));
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(AgentConfig::default(), None)
    }
}
