//! Logical shader inputs and their resolved locations.

/// Every uniform the host may write, named by what it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Model,
    ModelInvTr,
    ViewProj,
    Color,
    NoiseTex,
    CubeSize,
    Time,
    WaveSpeed,
    WaveAmpl,
    W0,
    IRange,
    FlowSpeed,
    GradDisp,
    GradRot,
    Octs,
    MixW,
    Scaling,
    Expo,
}

impl Param {
    pub const ALL: [Param; 18] = [
        Param::Model,
        Param::ModelInvTr,
        Param::ViewProj,
        Param::Color,
        Param::NoiseTex,
        Param::CubeSize,
        Param::Time,
        Param::WaveSpeed,
        Param::WaveAmpl,
        Param::W0,
        Param::IRange,
        Param::FlowSpeed,
        Param::GradDisp,
        Param::GradRot,
        Param::Octs,
        Param::MixW,
        Param::Scaling,
        Param::Expo,
    ];

    pub fn glsl_name(self) -> &'static str {
        match self {
            Param::Model => "u_Model",
            Param::ModelInvTr => "u_ModelInvTr",
            Param::ViewProj => "u_ViewProj",
            Param::Color => "u_Color",
            Param::NoiseTex => "u_NoiseTex",
            Param::CubeSize => "u_CubeSize",
            Param::Time => "u_Time",
            Param::WaveSpeed => "u_WaveSpeed",
            Param::WaveAmpl => "u_WaveAmpl",
            Param::W0 => "fbm_w0",
            Param::IRange => "fbm_iRange",
            Param::FlowSpeed => "fbm_flowSpeed",
            Param::GradDisp => "fbm_gradDisp",
            Param::GradRot => "fbm_gradRot",
            Param::Octs => "fbm_octs",
            Param::MixW => "fbm_mixW",
            Param::Scaling => "fbm_scaling",
            Param::Expo => "fbm_expo",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-vertex input streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Position,
    Normal,
    Color,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Position, Attribute::Normal, Attribute::Color];

    pub fn glsl_name(self) -> &'static str {
        match self {
            Attribute::Position => "vs_Pos",
            Attribute::Normal => "vs_Nor",
            Attribute::Color => "vs_Col",
        }
    }
}

/// Maps each [`Param`] to the location the linked program reported, if any.
///
/// A shader variant may leave any uniform out; writes to such a slot are
/// dropped here and never reach the backend.
pub struct UniformTable<L> {
    slots: Vec<Option<L>>,
}

impl<L> UniformTable<L> {
    pub fn resolve(mut lookup: impl FnMut(&'static str) -> Option<L>) -> Self {
        Self {
            slots: Param::ALL.iter().map(|p| lookup(p.glsl_name())).collect(),
        }
    }

    pub fn get(&self, param: Param) -> Option<&L> {
        self.slots[param.index()].as_ref()
    }

    pub fn is_bound(&self, param: Param) -> bool {
        self.get(param).is_some()
    }

    /// Runs `write` with the location of `param` when it resolved. Returns
    /// whether the write happened.
    pub fn write(&self, param: Param, write: impl FnOnce(&L)) -> bool {
        match self.get(param) {
            Some(location) => {
                write(location);
                true
            }
            None => false,
        }
    }

    pub fn bound(&self) -> impl Iterator<Item = Param> + '_ {
        Param::ALL.into_iter().filter(|p| self.is_bound(*p))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttribTable {
    pub position: Option<u32>,
    pub normal: Option<u32>,
    pub color: Option<u32>,
}

impl AttribTable {
    pub fn resolve(mut lookup: impl FnMut(&'static str) -> Option<u32>) -> Self {
        Self {
            position: lookup(Attribute::Position.glsl_name()),
            normal: lookup(Attribute::Normal.glsl_name()),
            color: lookup(Attribute::Color.glsl_name()),
        }
    }

    pub fn get(&self, attribute: Attribute) -> Option<u32> {
        match attribute {
            Attribute::Position => self.position,
            Attribute::Normal => self.normal,
            Attribute::Color => self.color,
        }
    }
}
