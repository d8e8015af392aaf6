//! Outline parser construction from a [`DispatchConfig`].

use crate::config::DispatchConfig;
use crate::error::Result;
use crate::parser::Parser;

use super::builder::OutlineBuilder;
use super::handlers::{ElementHandler, IncludeHandler, ScopeHandler};

/// Create an outline parser configured from `config`.
///
/// Plain elements are registered first, then include tags, then scopes, so
/// a name listed in several places ends up with the later role.
pub fn create_outline_parser(config: &DispatchConfig) -> Result<Parser<OutlineBuilder>> {
    let mut parser = Parser::with_config(OutlineBuilder::new(), config.parser_config());

    if !config.elements.is_empty() {
        parser.add_handler(ElementHandler::new(config.elements.join(",")))?;
    }

    if !config.include_tags.is_empty() {
        parser.add_handler(IncludeHandler::new(config.include_tags.join(",")))?;
    }

    for scope in &config.scopes {
        parser.add_handler(ScopeHandler::new(
            &scope.container,
            &scope.claims,
            scope.label.clone(),
        )?)?;
    }

    tracing::debug!(
        handlers = parser.registry().handler_count(),
        tags = parser.registry().registered_tags().len(),
        "Created outline parser"
    );
    Ok(parser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScopeRule;
    use crate::error::DispatchError;
    use crate::outline::OutlineNode;

    #[test]
    fn test_empty_config_keeps_only_text() {
        let mut parser = create_outline_parser(&DispatchConfig::default()).unwrap();
        assert_eq!(parser.registry().handler_count(), 0);

        let outline = parser.parse("a<b>b</b>c").unwrap();
        assert_eq!(outline, [OutlineNode::text("a"), OutlineNode::text("c")]);
    }

    #[test]
    fn test_config_registers_all_roles() {
        let config = DispatchConfig {
            elements: vec!["p".into(), "b".into()],
            include_tags: vec!["include".into()],
            scopes: vec![ScopeRule {
                container: "MYITEMS".into(),
                claims: "IT".into(),
                label: "item".into(),
            }],
            ..DispatchConfig::default()
        };
        let parser = create_outline_parser(&config).unwrap();

        assert_eq!(
            parser.registry().registered_tags(),
            ["B", "INCLUDE", "MYITEMS", "P"]
        );
        assert_eq!(parser.registry().handler_count(), 3);
    }

    #[test]
    fn test_config_max_depth_is_applied() {
        let config = DispatchConfig {
            max_depth: 2,
            elements: vec!["B".into()],
            ..DispatchConfig::default()
        };
        let mut parser = create_outline_parser(&config).unwrap();

        assert!(parser.parse("<b>ok</b>").is_ok());
        assert!(matches!(
            parser.parse("<b><b>deep</b></b>"),
            Err(DispatchError::DepthExceeded { limit: 2 })
        ));
    }

    #[test]
    fn test_invalid_element_name_is_rejected() {
        let config = DispatchConfig {
            elements: vec!["not valid".into()],
            ..DispatchConfig::default()
        };
        assert!(matches!(
            create_outline_parser(&config),
            Err(DispatchError::InvalidTagName(_))
        ));
    }
}
