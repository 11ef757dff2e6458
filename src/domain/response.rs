#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The `isError` member of a NeXXt Mobile reply.
pub enum ErrorFlag {
    Absent,
    Set(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Decoded NeXXt Mobile reply body, shared by the send and balance functions.
pub struct NexxtMobileResponse {
    pub is_error: ErrorFlag,
    /// `result.balanceFormated`, verbatim (the gateway spells it this way).
    pub balance_formatted: Option<String>,
}
