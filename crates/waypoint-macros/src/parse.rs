//! Parsing of `#[reflect(...)]` and `#[serde(...)]` attributes.

use syn::{
    parse::ParseStream, spanned::Spanned, Attribute, Expr, ExprLit, Lit, LitStr, Meta, Path, Token,
};

/// Options read from the type's attributes.
#[derive(Debug, Default)]
pub struct ContainerAttrs {
    /// XML root element name.
    pub xml_root: Option<String>,
    /// `rename_all` rule from serde.
    pub rename_all: Option<RenameRule>,
    /// Path of the `waypoint_docs` crate in generated code.
    pub crate_path: Option<Path>,
}

impl ContainerAttrs {
    /// Reads container options; `#[reflect]` wins over `#[serde]`.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();
        let mut serde_rename = None;

        for attr in attrs {
            if attr.path().is_ident("reflect") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("xml_root") {
                        result.xml_root = Some(string_value(meta.input)?);
                    } else if meta.path.is_ident("crate") {
                        let lit: LitStr = meta.value()?.parse()?;
                        result.crate_path = Some(lit.parse()?);
                    } else {
                        return Err(meta.error("unknown reflect attribute"));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                        serde_rename = Some(string_value(meta.input)?);
                    } else if meta.path.is_ident("rename_all") && meta.input.peek(Token![=]) {
                        let lit: LitStr = meta.value()?.parse()?;
                        let rule = RenameRule::parse(&lit.value())
                            .ok_or_else(|| syn::Error::new(lit.span(), "unknown rename_all rule"))?;
                        result.rename_all = Some(rule);
                    } else {
                        skip_value(meta.input)?;
                    }
                    Ok(())
                })?;
            }
        }

        if result.xml_root.is_none() {
            result.xml_root = serde_rename;
        }
        Ok(result)
    }
}

/// Options read from a field's attributes.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Explicit JSON naming tag.
    pub json: Option<String>,
    /// Explicit XML naming tag.
    pub xml: Option<String>,
    /// Description; falls back to doc comments.
    pub description: Option<String>,
    /// Embedded field.
    pub flatten: bool,
    /// serde `rename`.
    pub rename: Option<String>,
    /// serde `skip` / `skip_serializing`.
    pub skip: bool,
    /// serde `skip_serializing_if`.
    pub omit_empty: bool,
}

impl FieldAttrs {
    /// Reads field options from `#[reflect]`, `#[serde]` and doc comments.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();
        let mut docs = Vec::new();

        for attr in attrs {
            if attr.path().is_ident("reflect") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("json") {
                        result.json = Some(string_value(meta.input)?);
                    } else if meta.path.is_ident("xml") {
                        result.xml = Some(string_value(meta.input)?);
                    } else if meta.path.is_ident("description") {
                        result.description = Some(string_value(meta.input)?);
                    } else if meta.path.is_ident("flatten") {
                        result.flatten = true;
                    } else {
                        return Err(meta.error("unknown reflect attribute"));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                        result.rename = Some(string_value(meta.input)?);
                    } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                        result.skip = true;
                    } else if meta.path.is_ident("skip_serializing_if") {
                        result.omit_empty = true;
                        skip_value(meta.input)?;
                    } else if meta.path.is_ident("flatten") {
                        result.flatten = true;
                    } else {
                        skip_value(meta.input)?;
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("doc") {
                if let Some(line) = doc_line(attr) {
                    docs.push(line);
                }
            }
        }

        if result.description.is_none() && !docs.is_empty() {
            result.description = Some(docs.join(" "));
        }
        Ok(result)
    }

    /// The JSON tag for a field serialized as `name`.
    pub fn json_tag(&self, name: &str) -> Option<String> {
        if let Some(tag) = &self.json {
            return Some(tag.clone());
        }
        if self.skip {
            return Some("-".to_string());
        }
        if self.omit_empty {
            return Some(format!("{name},omitempty"));
        }
        self.rename.is_some().then(|| name.to_string())
    }

    /// The XML tag for a field serialized as `name`. A leading `@` marks an
    /// attribute.
    pub fn xml_tag(&self, name: &str) -> Option<String> {
        if let Some(tag) = &self.xml {
            return Some(tag.clone());
        }
        if self.skip {
            return Some("-".to_string());
        }

        let mut tag = match name.strip_prefix('@') {
            Some(attribute) => format!("{attribute},attr"),
            None if self.rename.is_some() => name.to_string(),
            None => String::new(),
        };
        if self.omit_empty {
            if tag.is_empty() {
                tag.push_str(name);
            }
            tag.push_str(",omitempty");
        }
        (!tag.is_empty()).then_some(tag)
    }
}

/// serde `rename_all` conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    /// `lowercase`
    Lower,
    /// `UPPERCASE`
    Upper,
    /// `PascalCase`
    Pascal,
    /// `camelCase`
    Camel,
    /// `snake_case`
    Snake,
    /// `SCREAMING_SNAKE_CASE`
    ScreamingSnake,
    /// `kebab-case`
    Kebab,
    /// `SCREAMING-KEBAB-CASE`
    ScreamingKebab,
}

impl RenameRule {
    fn parse(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            _ => return None,
        })
    }

    /// Applies the rule to a snake_case field name.
    pub fn apply(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_ascii_lowercase(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => pascal(field),
            Self::Camel => {
                let pascal = pascal(field);
                let mut chars = pascal.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_ascii_lowercase().to_string() + chars.as_str()
                })
            }
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.replace('_', "-").to_ascii_uppercase(),
        }
    }
}

fn pascal(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

fn string_value(input: ParseStream) -> syn::Result<String> {
    input.parse::<Token![=]>()?;
    let lit: LitStr = input.parse()?;
    Ok(lit.value())
}

/// Consumes `= value` or `(...)` of serde options this crate ignores.
fn skip_value(input: ParseStream) -> syn::Result<()> {
    if input.peek(Token![=]) {
        input.parse::<Token![=]>()?;
        input.parse::<Expr>()?;
    } else if input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in input);
        content.parse::<proc_macro2::TokenStream>()?;
    }
    Ok(())
}

fn doc_line(attr: &Attribute) -> Option<String> {
    let Meta::NameValue(nv) = &attr.meta else {
        return None;
    };
    let Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) = &nv.value else {
        return None;
    };
    let line = s.value().trim().to_string();
    (!line.is_empty()).then_some(line)
}

/// Error for an unsupported item.
pub fn unsupported(item: &impl Spanned, what: &str) -> syn::Error {
    syn::Error::new(item.span(), format!("Reflect cannot be derived for {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn field_attrs(attrs: &[Attribute]) -> FieldAttrs {
        FieldAttrs::from_attrs(attrs).unwrap()
    }

    #[test]
    fn test_reflect_field_attributes() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[reflect(json = "id,omitempty", xml = "item>id", description = "Identifier")]),
            parse_quote!(#[reflect(flatten)]),
        ];
        let attrs = field_attrs(&attrs);
        assert_eq!(attrs.json.as_deref(), Some("id,omitempty"));
        assert_eq!(attrs.xml.as_deref(), Some("item>id"));
        assert_eq!(attrs.description.as_deref(), Some("Identifier"));
        assert!(attrs.flatten);
    }

    #[test]
    fn test_serde_field_attributes() {
        let attrs: Vec<Attribute> = vec![parse_quote!(
            #[serde(rename = "userId", skip_serializing_if = "Option::is_none", default)]
        )];
        let attrs = field_attrs(&attrs);
        assert_eq!(attrs.json_tag("userId").as_deref(), Some("userId,omitempty"));
        assert_eq!(attrs.xml_tag("userId").as_deref(), Some("userId,omitempty"));
    }

    #[test]
    fn test_serde_skip_hides_both_media() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[serde(skip)])];
        let attrs = field_attrs(&attrs);
        assert_eq!(attrs.json_tag("secret").as_deref(), Some("-"));
        assert_eq!(attrs.xml_tag("secret").as_deref(), Some("-"));
    }

    #[test]
    fn test_serde_attribute_prefix() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[serde(rename = "@id")])];
        let attrs = field_attrs(&attrs);
        assert_eq!(attrs.xml_tag("@id").as_deref(), Some("id,attr"));
    }

    #[test]
    fn test_plain_field_has_no_tags() {
        let attrs = field_attrs(&[]);
        assert!(attrs.json_tag("name").is_none());
        assert!(attrs.xml_tag("name").is_none());
    }

    #[test]
    fn test_doc_comment_description() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[doc = " The user's"]),
            parse_quote!(#[doc = " display name."]),
        ];
        let attrs = field_attrs(&attrs);
        assert_eq!(attrs.description.as_deref(), Some("The user's display name."));
    }

    #[test]
    fn test_unknown_reflect_attribute_rejected() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[reflect(yaml = "x")])];
        assert!(FieldAttrs::from_attrs(&attrs).is_err());
    }

    #[test]
    fn test_container_attributes() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[serde(rename = "person", rename_all = "camelCase")]),
            parse_quote!(#[reflect(crate = "crate::docs")]),
        ];
        let attrs = ContainerAttrs::from_attrs(&attrs).unwrap();
        assert_eq!(attrs.xml_root.as_deref(), Some("person"));
        assert_eq!(attrs.rename_all, Some(RenameRule::Camel));
        assert!(attrs.crate_path.is_some());

        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[serde(rename = "person")]),
            parse_quote!(#[reflect(xml_root = "human")]),
        ];
        let attrs = ContainerAttrs::from_attrs(&attrs).unwrap();
        assert_eq!(attrs.xml_root.as_deref(), Some("human"));
    }

    #[test]
    fn test_rename_rules() {
        assert_eq!(RenameRule::Camel.apply("first_name"), "firstName");
        assert_eq!(RenameRule::Pascal.apply("first_name"), "FirstName");
        assert_eq!(RenameRule::Kebab.apply("first_name"), "first-name");
        assert_eq!(RenameRule::ScreamingSnake.apply("first_name"), "FIRST_NAME");
        assert_eq!(RenameRule::Lower.apply("id"), "id");
    }
}
