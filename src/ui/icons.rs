//! Shared UI icons and emojis.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");
pub static PIVOT: Emoji<'_, '_> = Emoji("🔄 ", "[<-]");

// Board indicators
pub static LOCK: Emoji<'_, '_> = Emoji("🔒 ", "[L]");
pub static COLUMN: Emoji<'_, '_> = Emoji("📊 ", "#");
pub static SKIP: Emoji<'_, '_> = Emoji("💾 ", "[local]");

pub static HOT: Emoji<'_, '_> = Emoji("🔥", "H");
pub static WARM: Emoji<'_, '_> = Emoji("☀️", "W");
pub static COLD: Emoji<'_, '_> = Emoji("❄️", "C");
