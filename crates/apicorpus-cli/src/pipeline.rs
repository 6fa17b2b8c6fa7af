//! Collection orchestrator.
//!
//! Drives one document at a time through
//! `fetch -> convert -> stamp origin -> identity -> fixup -> merge patches -> validate -> persist`.
//! Document-level failures become [`FailureReport`]s and never stop the run;
//! only fatal errors (broken invariants) are returned as `Err`.

use serde_json::Value;
use tracing::{debug, info, warn};

use apicorpus_core::document::{CanonicalDocument, Origin};
use apicorpus_core::fixup::{apply_fixup_with, IdentityStrategy};
use apicorpus_core::identity::{resolve_identity, ApiPath};
use apicorpus_core::pipeline::stages::{apply_overlays, IdentityClaims};
use apicorpus_core::pipeline::{DocumentReport, DocumentState, FailureReport, StageId};
use apicorpus_core::{CorpusError, CorpusResult};
use apicorpus_plugins::{ConversionInput, PluginRegistry};
use apicorpus_store::{load_fixup, load_overlays, record_correction, Store};

use crate::io::edit::EditSession;
use crate::io::input;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Persist,
    /// Run every stage except persistence.
    CheckOnly,
}

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub url: String,
    pub format: String,
}

impl Source {
    pub fn new(url: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: format.into(),
        }
    }
}

/// Outcome of one `process_one` call plus what a correction session needs.
#[derive(Debug)]
pub struct Attempt {
    pub report: DocumentReport,
    pub path: Option<ApiPath>,
    /// Conversion output with the origin stamped, before any overlay.
    pub pristine: Option<Value>,
}

#[derive(Default)]
struct Trail {
    path: Option<ApiPath>,
    pristine: Option<Value>,
}

struct Failure {
    stage: StageId,
    error: CorpusError,
    partial: Option<Value>,
    warnings: Vec<String>,
}

impl Failure {
    fn at(stage: StageId, error: CorpusError) -> Self {
        Self {
            stage,
            error,
            partial: None,
            warnings: Vec::new(),
        }
    }

    fn with_partial(mut self, partial: &Value) -> Self {
        self.partial = Some(partial.clone());
        self
    }
}

fn step(state: DocumentState, next: DocumentState) -> Result<DocumentState, Failure> {
    state
        .advance(next)
        .map_err(|e| Failure::at(StageId::of_error(&e), e))
}

/// Overlays may rewrite anything except the identity the document is stored under.
fn check_identity_kept(path: &ApiPath, effective: &Value) -> CorpusResult<()> {
    let after = resolve_identity(&CanonicalDocument::new(effective.clone())?)?;
    if &after != path {
        return Err(CorpusError::identity(format!(
            "overlays change the identity from {path} to {after}"
        )));
    }
    Ok(())
}

pub struct Orchestrator<'a> {
    store: &'a Store,
    plugins: &'a PluginRegistry,
    strategy: IdentityStrategy,
    mode: Mode,
    claims: IdentityClaims,
}

impl<'a> Orchestrator<'a> {
    pub fn new(store: &'a Store, plugins: &'a PluginRegistry, strategy: IdentityStrategy, mode: Mode) -> Self {
        Self {
            store,
            plugins,
            strategy,
            mode,
            claims: IdentityClaims::new(),
        }
    }

    /// Run the whole pipeline for one source.
    pub async fn process_one(&mut self, source: &Source) -> CorpusResult<Attempt> {
        let raw = match input::resolve_to_json(&source.url).await {
            Ok(v) => v,
            Err(e) => {
                let msg = format!("{e:#}");
                warn!(url = %source.url, error = %msg, "fetch failed");
                let report = FailureReport::from_messages(&source.url, &source.format, StageId::Fetch, vec![msg]);
                return Ok(Attempt {
                    report: DocumentReport::Failed(report),
                    path: None,
                    pristine: None,
                });
            }
        };

        let mut trail = Trail::default();
        let outcome = self.run_stages(source, &raw, &mut trail);
        let report = match outcome {
            Ok(report) => report,
            Err(f) if f.error.is_fatal() => return Err(f.error),
            Err(f) => {
                warn!(url = %source.url, stage = f.stage.as_str(), error = %f.error, "document failed");
                DocumentReport::Failed(
                    FailureReport::new(&source.url, &source.format, f.stage, &f.error)
                        .with_source(Some(raw))
                        .with_partial(f.partial)
                        .with_warnings(f.warnings),
                )
            }
        };
        Ok(Attempt {
            report,
            path: trail.path,
            pristine: trail.pristine,
        })
    }

    fn run_stages(&mut self, source: &Source, raw: &Value, trail: &mut Trail) -> Result<DocumentReport, Failure> {
        let state = DocumentState::Fetched;

        let registered = self
            .plugins
            .converter_for(&source.format)
            .map_err(|e| Failure::at(StageId::Convert, CorpusError::conversion(e.to_string())))?;
        let converter = &registered.converter;
        debug!(url = %source.url, converter = converter.name(), version = converter.version(), "converting");
        let converted = converter
            .convert(&ConversionInput {
                source: raw,
                source_url: &source.url,
                format: &source.format,
            })
            .map_err(|e| {
                let msg = format!("{} {}: {e:#}", converter.name(), converter.version());
                Failure::at(StageId::Convert, CorpusError::conversion(msg))
            })?;

        let partial = converted.document.clone();
        let doc = CanonicalDocument::new(converted.document)
            .and_then(|mut d| {
                d.stamp_origin(Origin::new(&source.format, &converted.format_version, &source.url))?;
                Ok(d)
            })
            .map_err(|e| Failure::at(StageId::Convert, e).with_partial(&partial))?;
        let state = step(state, DocumentState::Converted)?;

        let path = resolve_identity(&doc).map_err(|e| Failure::at(StageId::Identity, e).with_partial(doc.body()))?;
        debug!(url = %source.url, %path, "resolved identity");
        trail.path = Some(path.clone());
        self.claims
            .claim(&path, &source.url)
            .map_err(|e| Failure::at(StageId::Identity, e).with_partial(doc.body()))?;

        let pristine = doc.into_body();
        trail.pristine = Some(pristine.clone());

        let overlays = load_overlays(self.store, &path).map_err(|e| {
            let stage = match e {
                CorpusError::FixupApply(_) => StageId::Fixup,
                _ => StageId::Patch,
            };
            Failure::at(stage, e).with_partial(&pristine)
        })?;
        if !overlays.is_empty() {
            debug!(
                %path,
                fixup = overlays.fixup.is_some(),
                patches = ?overlays.patches.levels(),
                effective = %overlays.patches.effective(),
                "applying overlays"
            );
        }
        let effective = apply_overlays(&self.strategy, &pristine, &overlays)
            .map_err(|(stage, e)| Failure::at(stage, e).with_partial(&pristine))?;
        check_identity_kept(&path, &effective).map_err(|e| Failure::at(StageId::Identity, e).with_partial(&effective))?;
        let state = step(state, DocumentState::Patched)?;

        let validation = self.plugins.validate(&effective);
        for w in &validation.warnings {
            warn!(%path, "{w}");
        }
        if let Some(e) = validation.to_error() {
            let mut f = Failure::at(StageId::Validate, e).with_partial(&effective);
            f.warnings = validation.warnings;
            return Err(f);
        }
        let state = step(state, DocumentState::Validated)?;

        match self.mode {
            Mode::CheckOnly => Ok(DocumentReport::Checked {
                source_url: source.url.clone(),
                location: self.store.spec_location(&path),
                warnings: validation.warnings,
            }),
            Mode::Persist => {
                let location = self
                    .store
                    .save_document(&path, &effective)
                    .map_err(|e| Failure::at(StageId::Persist, e).with_partial(&effective))?;
                step(state, DocumentState::Persisted)?;
                info!(%location, url = %source.url, "persisted");
                Ok(DocumentReport::Persisted {
                    source_url: source.url.clone(),
                    location,
                    warnings: validation.warnings,
                })
            }
        }
    }

    /// Open an edit session on a failed attempt and record the correction.
    ///
    /// The operator edits the pristine document with the stored fixup
    /// replayed, before merge patches. Returns `false` when the attempt
    /// failed too early to have an identity. Session errors are returned and
    /// abort the run.
    pub fn correct(&self, attempt: &Attempt, session: &dyn EditSession) -> anyhow::Result<bool> {
        let (Some(path), Some(pristine)) = (&attempt.path, &attempt.pristine) else {
            warn!("document failed before identity resolution; nothing to correct");
            return Ok(false);
        };

        let replayed = load_fixup(self.store, path).and_then(|stored| match stored {
            Some(f) => apply_fixup_with(&self.strategy, pristine, &f).map(|doc| (Some(f), doc)),
            None => Ok((None, pristine.clone())),
        });
        let (applied, current) = match replayed {
            Ok(pair) => pair,
            Err(e) => {
                warn!(%path, error = %e, "stored fixup no longer applies; editing from the pristine document");
                (None, pristine.clone())
            }
        };

        let edited = session.edit(&current, &path.to_string())?;
        record_correction(self.store, &self.strategy, path, applied.as_ref(), &current, &edited)?;
        Ok(true)
    }
}
