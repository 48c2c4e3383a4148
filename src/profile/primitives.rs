//! Communication primitives recognised in TAU function summaries.
//!
//! The table is matched in order and the first entry whose name equals the
//! function name, or is a prefix of it, wins. TAU decorates some names
//! (e.g. `MPI_Send() [THROTTLED]`), which is why prefixes count.

/// Name of the root computation unit whose inclusive time is the run time.
pub const ROOT_FUNCTION: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Counted towards communication time.
    Communication,
    /// Startup/teardown overhead, tracked but not counted as communication.
    Lifecycle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub name: &'static str,
    pub kind: PrimitiveKind,
}

const fn comm(name: &'static str) -> Primitive {
    Primitive {
        name,
        kind: PrimitiveKind::Communication,
    }
}

const fn lifecycle(name: &'static str) -> Primitive {
    Primitive {
        name,
        kind: PrimitiveKind::Lifecycle,
    }
}

pub const PRIMITIVES: &[Primitive] = &[
    comm("MPI_Sendrecv()"),
    comm("MPI_Send()"),
    comm("MPI_Recv()"),
    comm("MPI_Isend()"),
    comm("MPI_Irecv()"),
    comm("MPI_Wait()"),
    comm("MPI_Waitall()"),
    comm("MPI_Allreduce()"),
    comm("MPI_Reduce()"),
    comm("MPI_Barrier()"),
    lifecycle("MPI_Init()"),
    lifecycle("MPI_Finalize()"),
    comm("MPI Collective Sync"),
];

/// First primitive matching `func_name` exactly or as a prefix.
pub fn match_primitive(func_name: &str) -> Option<&'static Primitive> {
    PRIMITIVES
        .iter()
        .find(|p| func_name == p.name || func_name.starts_with(p.name))
}

/// Look up a primitive by its exact table name.
pub fn primitive(name: &str) -> Option<&'static Primitive> {
    PRIMITIVES.iter().find(|p| p.name == name)
}

/// Functions sampled per node for imbalance detection.
pub fn is_tracked(func_name: &str) -> bool {
    func_name == ROOT_FUNCTION || match_primitive(func_name).is_some()
}
