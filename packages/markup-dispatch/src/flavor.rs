//! The hooks a concrete parser flavor supplies to the engine.

use crate::error::Result;
use crate::parser::Parser;
use crate::tag::Tag;

/// A concrete parser specialization.
///
/// The engine owns one flavor value per parser. The flavor receives every
/// text run, builds whatever product it likes, and may replace the default
/// tag dispatch. Handlers reach it through [`Parser::flavor_mut`].
pub trait ParserFlavor: Sized + 'static {
    /// Result of a complete parse.
    type Product;

    /// Discard state left over from a previous pass. Called by `init`.
    fn reset(&mut self);

    /// Receive a contiguous run of text, in source order.
    ///
    /// Never called with an empty string. `text` is the largest run not
    /// broken by tags in the range being scanned.
    fn emit_text(&mut self, text: &str) -> Result<()>;

    /// Hand out the product built so far.
    fn product(&mut self) -> Self::Product;

    /// Route a tag. The default looks the tag up in the handler table.
    fn dispatch_tag(parser: &mut Parser<Self>, tag: &Tag) -> Result<()> {
        parser.dispatch_registered(tag).map(|_| ())
    }
}
