use std::collections::HashMap;
use std::sync::Arc;

use super::channel::channel_templates;
use super::command::{CommandTemplate, TemplateCategory};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate template id: {0}")]
    DuplicateId(String),

    #[error("Template id {id} does not start with its category prefix '{prefix}'")]
    BadPrefix { id: String, prefix: char },
}

/// Immutable set of templates, looked up by id.
///
/// Built once and shared behind an `Arc`; templates are handed out as
/// `Arc<CommandTemplate>` so cue actions can hold on to them cheaply.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: Vec<Arc<CommandTemplate>>,
    by_id: HashMap<String, usize>,
}

impl TemplateRegistry {
    pub fn new(templates: Vec<CommandTemplate>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for template in templates {
            let prefix = template.category.id_prefix();
            if !template.id.starts_with(prefix) {
                return Err(RegistryError::BadPrefix {
                    id: template.id,
                    prefix,
                });
            }
            if registry.by_id.contains_key(&template.id) {
                return Err(RegistryError::DuplicateId(template.id));
            }
            registry
                .by_id
                .insert(template.id.clone(), registry.templates.len());
            registry.templates.push(Arc::new(template));
        }
        Ok(registry)
    }

    /// Every template the console exposes
    pub fn x32() -> Result<Self, RegistryError> {
        Self::new(channel_templates())
    }

    pub fn get(&self, id: &str) -> Option<Arc<CommandTemplate>> {
        self.by_id.get(id).map(|&i| Arc::clone(&self.templates[i]))
    }

    pub fn by_category(&self, category: TemplateCategory) -> impl Iterator<Item = &Arc<CommandTemplate>> {
        self.templates.iter().filter(move |t| t.category == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CommandTemplate>> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
