use anyhow::Result;

use apicorpus_core::config::CorpusConfig;
use apicorpus_core::fixup::IdentityStrategy;
use apicorpus_core::pipeline::RunOutcome;
use apicorpus_plugins::builtin::builtin_registry;
use apicorpus_plugins::PluginRegistry;
use apicorpus_store::{Store, StoreConfig};

use crate::args::{Cli, Command};
use crate::io::edit::{EditSession, EditorSession};
use crate::pipeline::Mode;

mod add;
mod api;
mod plugins;
mod update;
mod urls;

/// Everything a command needs, built once per invocation.
pub struct Context {
    pub store: Store,
    pub config: CorpusConfig,
    pub plugins: PluginRegistry,
    pub force_success: bool,
}

impl Context {
    pub fn open(cli: &Cli) -> Result<Self> {
        let config = crate::config::load(&cli.store_root, cli.config.as_deref())?;
        let store = Store::open(StoreConfig::new(&cli.store_root).with_layout(config.layout.clone()))?;
        Ok(Self {
            store,
            config,
            plugins: builtin_registry()?,
            force_success: cli.force_success,
        })
    }

    pub fn strategy(&self) -> IdentityStrategy {
        IdentityStrategy::from_config(&self.config.identity)
    }

    pub fn exit_code(&self, outcome: &RunOutcome) -> u8 {
        outcome.exit_code(&self.config.exit, self.force_success)
    }
}

/// Run the selected command and return the process exit code.
pub async fn dispatch(cli: Cli) -> Result<u8> {
    let ctx = Context::open(&cli)?;
    match cli.command {
        Command::Urls => urls::run(&ctx),
        Command::Update => update::run(&ctx, Mode::Persist).await,
        Command::Validate => update::run(&ctx, Mode::CheckOnly).await,
        Command::Add { format, url, fixup } => {
            let session = if fixup { Some(EditorSession::from_env()?) } else { None };
            add::run(&ctx, &format, &url, session.as_ref().map(|s| s as &dyn EditSession)).await
        }
        Command::Api { root_url, out } => api::run(&ctx, &root_url, out.as_deref()),
        Command::Plugins => plugins::run(&ctx),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;

    use serde_json::{json, Value};

    use super::*;
    use crate::io::edit::EditError;

    pub fn context(root: &Path) -> Context {
        Context {
            store: Store::open(StoreConfig::new(root)).unwrap(),
            config: CorpusConfig::default(),
            plugins: builtin_registry().unwrap(),
            force_success: false,
        }
    }

    /// Write `doc` as a source file and return its path as a source URL.
    pub fn write_source(dir: &Path, name: &str, doc: &Value) -> String {
        let p = dir.join(name);
        std::fs::write(&p, serde_json::to_vec(doc).unwrap()).unwrap();
        p.to_string_lossy().into_owned()
    }

    pub fn acme_source(version: &str) -> Value {
        json!({"provider": "acme", "version": version, "host": "api.acme.com"})
    }

    /// Source whose conversion fails validation: two operations share an id.
    pub fn duplicate_op_source(version: &str) -> Value {
        json!({
            "provider": "acme",
            "version": version,
            "host": "api.acme.com",
            "paths": {
                "/a": {"get": {"operationId": "op"}},
                "/b": {"get": {"operationId": "op"}}
            }
        })
    }

    /// Edit session that applies a fixed transformation.
    pub struct Scripted<F>(pub F);

    impl<F: Fn(&Value) -> Value> EditSession for Scripted<F> {
        fn edit(&self, document: &Value, _label: &str) -> Result<Value, EditError> {
            Ok((self.0)(document))
        }
    }

    /// Edit session whose editor exits non-zero.
    pub struct Abandoned;

    impl EditSession for Abandoned {
        fn edit(&self, _document: &Value, _label: &str) -> Result<Value, EditError> {
            Err(EditError::EditorFailed {
                editor: "false".into(),
                status: "exit status: 1".into(),
            })
        }
    }
}
