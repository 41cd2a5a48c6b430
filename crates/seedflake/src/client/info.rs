/// General information about a [`FlakeClient`](crate::FlakeClient).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientInfo {
    pub epoch: u64,
    /// Worker ID of the live generator, if any.
    pub worker_id: Option<u64>,
    /// Seed of the live generator, if any.
    pub seed: Option<u64>,
    /// IDs issued since the client was created, across generator renewals.
    pub generated: u64,
    /// Whether a generator is currently available.
    pub generator: bool,
}
