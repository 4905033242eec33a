pub use scd_contracts::SCD_LANG_ID as LANG_ID;

/// Name of the generated dispatch loop's transaction aggregate.
pub const CURRENT_TX: &str = "currentTx";

/// Words read from an inbound message by the generated dispatch loop.
pub const MESSAGE_WORDS: usize = 4;

pub mod limits {
    pub const MAX_AUX_VARS: u64 = 10;
    pub const MAX_OPTIMIZATION_LEVEL: u64 = 3;
    pub const MAX_STACK_PAGES: u64 = 10;
    pub const MAX_ENUM_ENTRIES: usize = 10;
    /// The first message word carries the dispatch code.
    pub const MAX_METHOD_ARGS: usize = super::MESSAGE_WORDS - 1;
    /// SmartC packs a string literal into one 64-bit word.
    pub const MAX_STRING_LITERAL_BYTES: usize = 8;
    pub const MAX_INPUT_BYTES: usize = 1024 * 1024;

    pub fn max_input_bytes() -> usize {
        match std::env::var("SCDC_MAX_INPUT_BYTES") {
            Ok(v) => v
                .parse::<usize>()
                .ok()
                .filter(|v| *v > 0)
                .unwrap_or(MAX_INPUT_BYTES),
            Err(_) => MAX_INPUT_BYTES,
        }
    }
}

/// SmartC keywords, plus the C keywords SmartC rejects outright.
pub const RESERVED_WORDS: &[&str] = &[
    "asm", "break", "case", "const", "continue", "default", "do", "else", "exit", "fixed",
    "for", "goto", "halt", "if", "inline", "long", "register", "return", "sizeof", "sleep",
    "struct", "switch", "void", "while", "auto", "char", "double", "enum", "extern", "float",
    "int", "short", "signed", "static", "typedef", "union", "unsigned", "volatile",
];

/// Identifiers the generated skeleton defines itself.
pub const SKELETON_SYMBOLS: &[&str] = &["main", CURRENT_TX];

/// SmartC built-in API functions; a declaration with one of these names shadows the call.
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    // transactions
    "getNextTx", "getNextTxFromBlockheight", "getBlockheight", "getAmount", "getAmountFx",
    "getSender", "getType", "readMessage", "readShortMessage", "readAssets", "getQuantity",
    // blockchain
    "getCurrentBlockheight", "getWeakRandomNumber", "getPrevBlockHash", "getPrevBlockTimestamp",
    // accounts and contracts
    "getCreator", "getCreatorOf", "getCodeHashOf", "getActivationOf", "getCurrentBalance",
    "getCurrentBalanceFx", "getAccountBalance", "getAssetBalance", "getAssetBalanceFx",
    "getAssetCirculating", "getAssetHoldersCount",
    // sending
    "sendAmount", "sendAmountFx", "sendBalance", "sendQuantity", "sendQuantityAndAmount",
    "sendQuantityAndAmountFx", "sendMessage", "sendAmountAndMessage", "sendAmountAndMessageFx",
    "sendShortMessage",
    // assets
    "issueAsset", "mintAsset", "distributeToHolders", "distributeToHoldersFx",
    // maps
    "getMapValue", "getMapValueFx", "getExtMapValue", "getExtMapValueFx", "setMapValue",
    "setMapValueFx",
    // misc
    "checkSignature", "memcopy", "bcftol", "bcltof", "mdv", "pow", "powf",
];

/// Struct tag of the generated transaction aggregate.
pub const TX_STRUCT_TAG: &str = "TX";

pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
        || SKELETON_SYMBOLS.contains(&name)
        || BUILTIN_FUNCTIONS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_and_keywords_are_reserved() {
        for name in ["while", "main", "currentTx", "getNextTx", "sendAmount", "setMapValue"] {
            assert!(is_reserved(name), "{name}");
        }
        for name in ["owner", "send", "getNext", "SendAmount"] {
            assert!(!is_reserved(name), "{name}");
        }
    }
}
