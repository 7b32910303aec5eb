//! Village props: shared templates, prop factories, the fixed layout table,
//! the seeded cobble field and the assembler that puts it all together.

pub mod cobbles;
pub mod factories;
pub mod layout;
pub mod templates;
pub mod village;

pub use factories::{
    CottageHandles, LampHandles, StallHandles, TreeHandles, WellHandles, create_barrel,
    create_cottage, create_lamp, create_stall, create_tree, create_well,
};
pub use layout::LayoutEntry;
pub use templates::{Part, PropTemplates};
pub use village::{Village, VillageConfig, VillageHandles, build_village, village_fog};

pub fn crate_info() -> &'static str {
    "village-props v0.1.0"
}
