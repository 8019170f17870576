// Keeps the language prefix of the address bar in line with the authoritative
// language. Boot and in-page navigation share `decide`; they differ only in how
// a mismatch is corrected (hard redirect before anything rendered, in-place
// history replace afterwards).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hnav_utils::{
    EventBus, HeaderEvent, HistoryApi, HistoryError, HistoryMethod, Lang, is_prefixable,
    language_of, with_prefix,
};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::language_store::LanguageStore;
use crate::navigation_map::NavigationLanguageMap;
use crate::store::KeyValueStore;

/// Which input settled the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    LastChange,
    NavigationMap,
    UrlPrefix,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub lang: Lang,
    pub authority: Authority,
}

/// How the current path relates to a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlState {
    Unprefixed,
    PrefixMatchesAuthority,
    PrefixMismatch,
}

impl UrlState {
    pub fn classify(path: &str, authoritative: Lang) -> Self {
        match language_of(path) {
            None => UrlState::Unprefixed,
            Some(lang) if lang == authoritative => UrlState::PrefixMatchesAuthority,
            Some(_) => UrlState::PrefixMismatch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enforcement {
    /// The address already carries the right prefix, or cannot carry one.
    Unchanged { decision: Decision },
    Rewritten { decision: Decision, from: String, to: String },
    /// The same rewrite already failed for this address; not retried.
    Duplicate { decision: Decision, to: String },
    Failed { decision: Decision, error: HistoryError },
}

impl Enforcement {
    pub fn decision(&self) -> Decision {
        match self {
            Enforcement::Unchanged { decision }
            | Enforcement::Rewritten { decision, .. }
            | Enforcement::Duplicate { decision, .. }
            | Enforcement::Failed { decision, .. } => *decision,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// The path is never prefixed (assets, api...).
    NotApplicable,
    Redirected { target: String, lang: Lang },
    /// Another script already issued the same redirect moments ago.
    RedirectInFlight { target: String },
    /// The path already had a prefix; handled like any navigation event.
    Enforced(Enforcement),
    RedirectFailed { target: String, error: HistoryError },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RedirectMarker {
    target: String,
    at: u64,
}

#[derive(Debug, Clone)]
pub struct EnforcerOptions {
    pub default_lang: Lang,
    pub browser_lang: Option<Lang>,
    pub redirect_marker_key: String,
    pub redirect_marker_ttl_ms: u64,
}

impl Default for EnforcerOptions {
    fn default() -> Self {
        Self {
            default_lang: Lang::default(),
            browser_lang: None,
            redirect_marker_key: "langRedirectPending".to_owned(),
            redirect_marker_ttl_ms: 3_000,
        }
    }
}

pub struct UrlEnforcer {
    history: Rc<dyn HistoryApi>,
    store: Rc<LanguageStore>,
    map: Rc<NavigationLanguageMap>,
    session: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    bus: EventBus<HeaderEvent>,
    options: EnforcerOptions,
    failed_rewrite: RefCell<Option<(String, Lang)>>,
}

impl UrlEnforcer {
    pub fn new(
        history: Rc<dyn HistoryApi>,
        store: Rc<LanguageStore>,
        map: Rc<NavigationLanguageMap>,
        session: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        bus: EventBus<HeaderEvent>,
        options: EnforcerOptions,
    ) -> Self {
        Self {
            history,
            store,
            map,
            session,
            clock,
            bus,
            options,
            failed_rewrite: RefCell::new(None),
        }
    }

    /// Work out the authoritative language for the current address.
    ///
    /// Read-only: adopting a URL prefix is done by the entry points.
    pub fn decide(&self) -> Decision {
        let url = self.history.current_url();
        let last_change = self.store.get_last_change();
        let predicted = self.map.lookup(&url);

        if let Some(change) = &last_change {
            let newer = predicted
                .as_ref()
                .is_none_or(|entry| change.timestamp > entry.timestamp);

            if newer {
                return Decision {
                    lang: change.lang,
                    authority: Authority::LastChange,
                };
            }
        }

        if let Some(entry) = predicted {
            return Decision {
                lang: entry.lang,
                authority: Authority::NavigationMap,
            };
        }

        if let Some(lang) = language_of(&self.history.pathname()) {
            return Decision {
                lang,
                authority: Authority::UrlPrefix,
            };
        }

        let lang = last_change
            .map(|change| change.lang)
            .or_else(|| self.store.get())
            .or(self.options.browser_lang)
            .unwrap_or(self.options.default_lang);

        Decision {
            lang,
            authority: Authority::Fallback,
        }
    }

    /// Correct the address in place after popstate, link clicks, language
    /// changes and cross-tab updates.
    pub fn on_navigation_event(&self) -> Enforcement {
        let decision = self.decide();
        let path = self.history.pathname();
        let url = self.history.current_url();

        if decision.authority == Authority::UrlPrefix {
            self.adopt_url_language(&url, decision.lang);
        }

        if !is_prefixable(&path)
            || UrlState::classify(&path, decision.lang) == UrlState::PrefixMatchesAuthority
        {
            return Enforcement::Unchanged { decision };
        }

        let target = format!("{}{}", with_prefix(&path, decision.lang), self.history.search());

        let attempt = (url.clone(), decision.lang);

        if self.failed_rewrite.borrow().as_ref() == Some(&attempt) {
            tracing::debug!("rewrite of {url} to {target} already failed");
            return Enforcement::Duplicate { decision, to: target };
        }

        if let Err(error) = self.history.replace_state(&target) {
            tracing::warn!("in-place language rewrite failed: {error}");
            *self.failed_rewrite.borrow_mut() = Some(attempt);
            return Enforcement::Failed { decision, error };
        }

        *self.failed_rewrite.borrow_mut() = None;

        tracing::info!(from = %url, to = %target, language = %decision.lang, "rewrote url language");

        self.bus.emit(HeaderEvent::HistoryChanged {
            method: HistoryMethod::Replace,
            url: target.clone(),
        });

        if let Err(e) = self.map.record(&target, decision.lang, "enforcer") {
            tracing::warn!("could not record rewritten url {target}: {e}");
        }

        Enforcement::Rewritten {
            decision,
            from: url,
            to: target,
        }
    }

    /// First evaluation, before the page has rendered anything.
    pub fn on_boot(&self) -> BootOutcome {
        let path = self.history.pathname();

        if !is_prefixable(&path) {
            return BootOutcome::NotApplicable;
        }

        if language_of(&path).is_some() {
            self.clear_redirect_marker();
            return BootOutcome::Enforced(self.on_navigation_event());
        }

        let decision = self.decide();
        let target = format!("{}{}", with_prefix(&path, decision.lang), self.history.search());

        if self.pending_redirect().as_deref() == Some(target.as_str()) {
            tracing::debug!("redirect to {target} already in flight");
            return BootOutcome::RedirectInFlight { target };
        }

        self.mark_redirect(&target);

        match self.history.redirect(&target) {
            Ok(()) => {
                tracing::info!(to = %target, language = %decision.lang, "redirecting to prefixed url");
                BootOutcome::Redirected {
                    target,
                    lang: decision.lang,
                }
            }
            Err(error) => {
                tracing::warn!("boot redirect failed: {error}");
                self.clear_redirect_marker();
                BootOutcome::RedirectFailed { target, error }
            }
        }
    }

    /// Target of a redirect issued within the marker lifetime, if any.
    pub fn pending_redirect(&self) -> Option<String> {
        let raw = self
            .session
            .get_item(&self.options.redirect_marker_key)
            .ok()
            .flatten()?;
        let marker: RedirectMarker = serde_json::from_str(&raw).ok()?;

        let age = self.clock.now_ms().saturating_sub(marker.at);
        (age < self.options.redirect_marker_ttl_ms).then_some(marker.target)
    }

    fn mark_redirect(&self, target: &str) {
        let marker = RedirectMarker {
            target: target.to_owned(),
            at: self.clock.now_ms(),
        };

        let written = serde_json::to_string(&marker)
            .map_err(|e| e.to_string())
            .and_then(|encoded| {
                self.session
                    .set_item(&self.options.redirect_marker_key, &encoded)
                    .map_err(|e| e.to_string())
            });

        if let Err(e) = written {
            tracing::warn!("could not mark redirect in flight: {e}");
        }
    }

    fn clear_redirect_marker(&self) {
        if let Err(e) = self.session.remove_item(&self.options.redirect_marker_key) {
            tracing::debug!("could not clear redirect marker: {e}");
        }
    }

    fn adopt_url_language(&self, url: &str, lang: Lang) {
        if let Err(e) = self.store.set(lang, "url") {
            tracing::warn!("could not persist url language: {e}");
        }

        if let Err(e) = self.map.record(url, lang, "url") {
            tracing::warn!("could not record url language: {e}");
        }
    }
}

impl fmt::Debug for UrlEnforcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlEnforcer")
            .field("options", &self.options)
            .field("failed_rewrite", &self.failed_rewrite.borrow())
            .finish()
    }
}
