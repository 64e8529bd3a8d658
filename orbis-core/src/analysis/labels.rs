#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Toolbox,
    OxygenTank,
    FireExtinguisher,
}

/// Colour for labels outside the known classes.
pub const ACCENT_COLOR: [u8; 3] = [250, 204, 21];

impl Label {
    pub const ALL: [Label; 3] = [Label::Toolbox, Label::OxygenTank, Label::FireExtinguisher];

    pub const fn name(&self) -> &'static str {
        match self {
            Label::Toolbox => "Toolbox",
            Label::OxygenTank => "Oxygen Tank",
            Label::FireExtinguisher => "Fire Extinguisher",
        }
    }

    pub const fn color(&self) -> [u8; 3] {
        match self {
            Label::Toolbox => [59, 130, 246],         // Blue
            Label::OxygenTank => [46, 204, 112],      // Green
            Label::FireExtinguisher => [239, 67, 67], // Red
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.name() == name)
    }

    pub const fn label_size() -> usize {
        Self::ALL.len()
    }
}

/// Object classes the detection model was trained on.
pub fn object_classes() -> Vec<String> {
    Label::ALL.iter().map(|label| label.name().to_string()).collect()
}

/// Styling colour for any detector label, known or not.
pub fn label_color(name: &str) -> [u8; 3] {
    Label::from_name(name)
        .map(|label| label.color())
        .unwrap_or(ACCENT_COLOR)
}
