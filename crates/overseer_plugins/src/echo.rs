//! A demo command plugin: echoes its words back through the `Ui`.

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use overseer_system::{
    CommandFlag, CommandNode, CommandPlugin, ConsoleUi, DynamicInvoker, Factory, FactoryError, InjectedArgs,
    PluginInstance, PluginValue, Ui,
};

/// Echoes its command-line words back through the resolved `Ui`; the `loud`
/// subcommand upper-cases them first.
pub struct EchoPlugin {
    ui: Arc<dyn Ui>,
}

impl PluginValue for EchoPlugin {
    fn as_command(&self) -> Option<&dyn CommandPlugin> {
        Some(self)
    }
}

#[async_trait]
impl CommandPlugin for EchoPlugin {
    fn command_info(&self) -> CommandNode {
        CommandNode {
            name: "echo".into(),
            synopsis: "echo words back through the UI".into(),
            help: "echo <words...> — writes the words back through the UI, joined by spaces.".into(),
            flags: Vec::new(),
            children: vec![CommandNode {
                name: "loud".into(),
                synopsis: "echo words back, upper-cased".into(),
                help: "echo loud <words...> — like echo, but upper-cased.".into(),
                flags: vec![CommandFlag {
                    name: "loud".into(),
                    help: "upper-case the echoed words".into(),
                }],
                children: Vec::new(),
            }],
        }
    }

    async fn execute(&self, words: &[String]) -> Result<i64, Box<dyn StdError + Send + Sync>> {
        let loud = words.get(1).is_some_and(|w| w == "loud");
        let skip = if loud { 2 } else { 1 };
        let body = words.iter().skip(skip).cloned().collect::<Vec<_>>().join(" ");
        self.ui.say(&if loud { body.to_uppercase() } else { body });
        Ok(0)
    }
}

/// Constructs [`EchoPlugin`] values, resolving the `Ui` the owning scope
/// injected through the Dynamic Invoker (`# 4.B`'s default-injected args).
pub struct EchoFactory;

#[async_trait]
impl Factory for EchoFactory {
    async fn construct(&self, args: &InjectedArgs) -> Result<PluginInstance, FactoryError> {
        let ui = DynamicInvoker::new().resolve::<Arc<dyn Ui>>(args, "ui")?.clone();
        Ok(PluginInstance::new(EchoPlugin { ui }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_system::flatten;

    #[tokio::test]
    async fn execute_echoes_joined_words() {
        struct CapturingUi(std::sync::Mutex<Vec<String>>);
        impl Ui for CapturingUi {
            fn say(&self, message: &str) {
                self.0.lock().unwrap().push(message.to_string());
            }
            fn warn(&self, _message: &str) {}
            fn begin_status(&self, _message: &str) {}
            fn clear_status(&self) {}
        }

        let ui = Arc::new(CapturingUi(std::sync::Mutex::new(Vec::new())));
        let plugin = EchoPlugin { ui: ui.clone() };
        plugin
            .execute(&["echo".to_string(), "hello".to_string(), "world".to_string()])
            .await
            .unwrap();
        assert_eq!(ui.0.lock().unwrap().as_slice(), ["hello world"]);
    }

    #[tokio::test]
    async fn execute_loud_upper_cases() {
        struct NullUi;
        impl Ui for NullUi {
            fn say(&self, _message: &str) {}
            fn warn(&self, _message: &str) {}
            fn begin_status(&self, _message: &str) {}
            fn clear_status(&self) {}
        }

        let plugin = EchoPlugin { ui: Arc::new(NullUi) };
        let code = plugin
            .execute(&["echo".to_string(), "loud".to_string(), "hi".to_string()])
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn command_info_flattens_with_subcommand() {
        let plugin = EchoPlugin { ui: Arc::new(ConsoleUi) };
        let records = flatten(&plugin.command_info());
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["echo", "echo loud"]);
    }
}
