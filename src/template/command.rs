use super::param::{EnumParam, NonIter, OptionParam};

/// Console section a template addresses. Template ids start with the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateCategory {
    Channel,
    Aux,
    FxReturn,
    Bus,
    Matrix,
    Main,
    MonoMain,
    Dca,
    Fx,
    Output,
    Headamp,
    Insert,
    /// Show, cue, scene, snippet and preset management
    Show,
}

impl TemplateCategory {
    pub fn id_prefix(self) -> char {
        match self {
            TemplateCategory::Channel => 'C',
            TemplateCategory::Aux => 'A',
            TemplateCategory::FxReturn => 'R',
            TemplateCategory::Bus => 'B',
            TemplateCategory::Matrix => 'X',
            TemplateCategory::Main => 'S',
            TemplateCategory::MonoMain => 'M',
            TemplateCategory::Dca => 'D',
            TemplateCategory::Fx => 'F',
            TemplateCategory::Output => 'O',
            TemplateCategory::Headamp => 'H',
            TemplateCategory::Insert => 'I',
            TemplateCategory::Show => 'P',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TemplateCategory::Channel => "Channel",
            TemplateCategory::Aux => "Aux In",
            TemplateCategory::FxReturn => "FX Return",
            TemplateCategory::Bus => "Mix Bus",
            TemplateCategory::Matrix => "Matrix",
            TemplateCategory::Main => "Main Stereo",
            TemplateCategory::MonoMain => "Main Mono",
            TemplateCategory::Dca => "DCA",
            TemplateCategory::Fx => "Effects",
            TemplateCategory::Output => "Outputs",
            TemplateCategory::Headamp => "Headamps",
            TemplateCategory::Insert => "Inserts",
            TemplateCategory::Show => "Show",
        }
    }
}

/// One piece of an embedded path
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Literal(String),
    Option(OptionParam),
    Enum(EnumParam),
    NonIter(NonIter),
}

impl PathSegment {
    pub fn literal(text: &str) -> Self {
        PathSegment::Literal(text.to_string())
    }

    /// Whether this segment consumes a supplied value
    pub fn is_slot(&self) -> bool {
        !matches!(self, PathSegment::Literal(_))
    }
}

/// One trailing message argument
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentSlot {
    Option(OptionParam),
    Enum(EnumParam),
    NonIter(NonIter),
}

impl ArgumentSlot {
    pub fn name(&self) -> &str {
        match self {
            ArgumentSlot::Option(p) => &p.name,
            ArgumentSlot::Enum(p) => &p.name,
            ArgumentSlot::NonIter(p) => &p.name,
        }
    }
}

/// Path-with-slots plus trailing argument descriptors for one console control
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTemplate {
    pub id: String,
    pub name: String,
    pub category: TemplateCategory,
    pub path: Vec<PathSegment>,
    pub arguments: Vec<ArgumentSlot>,
    pub fade_enabled: bool,
}

impl CommandTemplate {
    /// Name is taken from the first argument's verbose name. Fading is enabled
    /// when the single argument is a fadeable NonIter.
    pub fn new(
        id: &str,
        category: TemplateCategory,
        path: Vec<PathSegment>,
        arguments: Vec<ArgumentSlot>,
    ) -> Self {
        let name = match arguments.first() {
            Some(ArgumentSlot::Option(p)) => p.verbose_name.clone(),
            Some(ArgumentSlot::Enum(p)) => p.verbose_name.clone(),
            Some(ArgumentSlot::NonIter(p)) => p.verbose_name.clone(),
            None => id.to_string(),
        };
        let fade_enabled = matches!(
            arguments.as_slice(),
            [ArgumentSlot::NonIter(n)] if n.param_type.is_fadeable()
        );
        Self {
            id: id.to_string(),
            name,
            category,
            path,
            arguments,
            fade_enabled,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Override the automatic fade flag. Fades still need a fadeable NonIter.
    pub fn with_fade(mut self, enabled: bool) -> Self {
        self.fade_enabled = enabled;
        self
    }

    /// Number of values `fill_path` expects
    pub fn path_slot_count(&self) -> usize {
        self.path.iter().filter(|s| s.is_slot()).count()
    }

    /// The leaf a fade drives, if this template can fade at all
    pub fn fade_target(&self) -> Option<&NonIter> {
        if !self.fade_enabled {
            return None;
        }
        match self.arguments.as_slice() {
            [ArgumentSlot::NonIter(n)] if n.param_type.is_fadeable() => Some(n),
            _ => None,
        }
    }
}
