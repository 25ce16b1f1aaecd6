use soroban_sdk::{contracterror, symbol_short, Symbol};

/// Typed error enum for the AgentPay contract.
///
/// Every entry point aborts with one of these kinds and zero state change;
/// errors are surfaced to the invoker, never persisted as records.
#[contracterror]
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord)]
#[cfg_attr(test, derive(Debug))]
#[repr(u32)]
pub enum AgentPayError {
    // Shape (1000–1003)
    AddressMismatch = 1000,
    WrongClass = 1001,
    // Signature and payload-decoding failures are trapped by the host before
    // dispatch; the variants exist so the error surface is complete.
    MissingSigner = 1002,
    BadSerialization = 1003,

    // Existence (1100–1102)
    NotFound = 1100,
    AlreadyExists = 1101,
    NoTreasury = 1102,

    // Value (1200–1203)
    BadAmount = 1200,
    MemoTooLong = 1201,
    ExpiryInPast = 1202,
    Insufficient = 1203,

    // State (1300–1305)
    NotPending = 1300,
    Expired = 1301,
    AlreadyTerminal = 1302,
    InvoiceNotPaid = 1303,
    WrongRecipient = 1304,
    SumMismatch = 1305,

    // Authorization / role (1400–1404)
    NotParty = 1400,
    NotArbiter = 1401,
    ProviderInactive = 1402,
    UnknownCapability = 1403,
    PriceBelowMinimum = 1404,

    // Size limits (1500–1505)
    EmptyBatch = 1500,
    BatchTooLarge = 1501,
    CapabilityListTooLarge = 1502,
    NameTooLong = 1503,
    DescriptionTooLong = 1504,
    CapabilityTooLong = 1505,

    // Dispute (1600–1602)
    WindowExpired = 1600,
    AlreadyDisputed = 1601,
    NotDisputed = 1602,

    // Streaming (1700–1703)
    StreamNotActive = 1700,
    StreamPaused = 1701,
    StreamNotPaused = 1702,
    InvalidSchedule = 1703,

    // Protocol administration (1800–1804)
    NotAdmin = 1800,
    NotInitialized = 1801,
    AlreadyInitialized = 1802,
    ContractPaused = 1803,
    ReentrantCall = 1804,
}

impl From<AgentPayError> for Symbol {
    fn from(error: AgentPayError) -> Self {
        match error {
            // Shape
            AgentPayError::AddressMismatch => symbol_short!("ADR_MM"),
            AgentPayError::WrongClass => symbol_short!("CLS_WR"),
            AgentPayError::MissingSigner => symbol_short!("SIG_MS"),
            AgentPayError::BadSerialization => symbol_short!("SER_BAD"),
            // Existence
            AgentPayError::NotFound => symbol_short!("NOT_FND"),
            AgentPayError::AlreadyExists => symbol_short!("EXISTS"),
            AgentPayError::NoTreasury => symbol_short!("NO_TRS"),
            // Value
            AgentPayError::BadAmount => symbol_short!("BAD_AMT"),
            AgentPayError::MemoTooLong => symbol_short!("MEMO_LN"),
            AgentPayError::ExpiryInPast => symbol_short!("EXP_PST"),
            AgentPayError::Insufficient => symbol_short!("INSUF"),
            // State
            AgentPayError::NotPending => symbol_short!("NOT_PND"),
            AgentPayError::Expired => symbol_short!("EXPIRED"),
            AgentPayError::AlreadyTerminal => symbol_short!("TERMNL"),
            AgentPayError::InvoiceNotPaid => symbol_short!("INV_NP"),
            AgentPayError::WrongRecipient => symbol_short!("WRG_RCP"),
            AgentPayError::SumMismatch => symbol_short!("SUM_MM"),
            // Authorization / role
            AgentPayError::NotParty => symbol_short!("NOT_PTY"),
            AgentPayError::NotArbiter => symbol_short!("NOT_ARB"),
            AgentPayError::ProviderInactive => symbol_short!("PRV_IN"),
            AgentPayError::UnknownCapability => symbol_short!("CAP_UNK"),
            AgentPayError::PriceBelowMinimum => symbol_short!("PRC_LOW"),
            // Size limits
            AgentPayError::EmptyBatch => symbol_short!("BCH_EMP"),
            AgentPayError::BatchTooLarge => symbol_short!("BCH_BIG"),
            AgentPayError::CapabilityListTooLarge => symbol_short!("CAP_BIG"),
            AgentPayError::NameTooLong => symbol_short!("NAME_LN"),
            AgentPayError::DescriptionTooLong => symbol_short!("DESC_LN"),
            AgentPayError::CapabilityTooLong => symbol_short!("CAP_LN"),
            // Dispute
            AgentPayError::WindowExpired => symbol_short!("WIN_EXP"),
            AgentPayError::AlreadyDisputed => symbol_short!("DSP_DUP"),
            AgentPayError::NotDisputed => symbol_short!("DSP_NO"),
            // Streaming
            AgentPayError::StreamNotActive => symbol_short!("STR_NA"),
            AgentPayError::StreamPaused => symbol_short!("STR_PS"),
            AgentPayError::StreamNotPaused => symbol_short!("STR_NP"),
            AgentPayError::InvalidSchedule => symbol_short!("STR_SCH"),
            // Protocol administration
            AgentPayError::NotAdmin => symbol_short!("NOT_ADM"),
            AgentPayError::NotInitialized => symbol_short!("NOT_INI"),
            AgentPayError::AlreadyInitialized => symbol_short!("ALR_INI"),
            AgentPayError::ContractPaused => symbol_short!("PAUSED"),
            AgentPayError::ReentrantCall => symbol_short!("REENTER"),
        }
    }
}
