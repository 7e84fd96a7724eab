#![forbid(unsafe_code)]

/// Every record type tracked by the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Specimen,
    Block,
    CuttingSession,
    Substrate,
    Section,
    Roi,
    AcquisitionTask,
    Acquisition,
    Tile,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Specimen,
        EntityKind::Block,
        EntityKind::CuttingSession,
        EntityKind::Substrate,
        EntityKind::Section,
        EntityKind::Roi,
        EntityKind::AcquisitionTask,
        EntityKind::Acquisition,
        EntityKind::Tile,
    ];

    /// Display name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Specimen => "Specimen",
            EntityKind::Block => "Block",
            EntityKind::CuttingSession => "Cutting Session",
            EntityKind::Substrate => "Substrate",
            EntityKind::Section => "Section",
            EntityKind::Roi => "ROI",
            EntityKind::AcquisitionTask => "Acquisition Task",
            EntityKind::Acquisition => "Acquisition",
            EntityKind::Tile => "Tile",
        }
    }

    /// Name of the human-readable key field.
    pub fn key_field(self) -> &'static str {
        match self {
            EntityKind::Specimen => "specimen_id",
            EntityKind::Block => "block_id",
            EntityKind::CuttingSession => "cutting_session_id",
            EntityKind::Substrate => "media_id",
            EntityKind::Section => "section_id",
            EntityKind::Roi => "roi_id",
            EntityKind::AcquisitionTask => "task_id",
            EntityKind::Acquisition => "acquisition_id",
            EntityKind::Tile => "tile_id",
        }
    }

    /// Collections that must be empty (for this record) before it can be deleted,
    /// in the order they are checked.
    pub fn dependents(self) -> &'static [Dependent] {
        match self {
            EntityKind::Specimen => &[Dependent {
                kind: EntityKind::Block,
                relation: Relation::Parent,
                label: "blocks",
            }],
            EntityKind::Block => &[Dependent {
                kind: EntityKind::CuttingSession,
                relation: Relation::Parent,
                label: "cutting sessions",
            }],
            EntityKind::CuttingSession => &[Dependent {
                kind: EntityKind::Section,
                relation: Relation::Parent,
                label: "sections",
            }],
            EntityKind::Substrate => &[Dependent {
                kind: EntityKind::Section,
                relation: Relation::Substrate,
                label: "sections",
            }],
            EntityKind::Section => &[Dependent {
                kind: EntityKind::Roi,
                relation: Relation::Parent,
                label: "ROIs",
            }],
            EntityKind::Roi => &[
                Dependent {
                    kind: EntityKind::Roi,
                    relation: Relation::ParentRoi,
                    label: "child ROIs",
                },
                Dependent {
                    kind: EntityKind::AcquisitionTask,
                    relation: Relation::Parent,
                    label: "acquisition tasks",
                },
                Dependent {
                    kind: EntityKind::Acquisition,
                    relation: Relation::Roi,
                    label: "acquisitions",
                },
            ],
            EntityKind::AcquisitionTask => &[Dependent {
                kind: EntityKind::Acquisition,
                relation: Relation::Parent,
                label: "acquisitions",
            }],
            EntityKind::Acquisition => &[Dependent {
                kind: EntityKind::Tile,
                relation: Relation::Parent,
                label: "tiles",
            }],
            EntityKind::Tile => &[],
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which reference on the dependent row points at the owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// The dependent's direct containment parent.
    Parent,
    /// Section → Substrate.
    Substrate,
    /// ROI → enclosing ROI.
    ParentRoi,
    /// Acquisition → ROI (its containment parent is the task).
    Roi,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dependent {
    pub kind: EntityKind,
    pub relation: Relation,
    pub label: &'static str,
}
