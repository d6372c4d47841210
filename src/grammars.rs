//! Example grammars built on the public combinator API
//!
//! - [`endpoint_url`]: broker connection URLs such as
//!   `amqps://user/secret@tcp:broker.example.com:5671,ssl:backup:5672`
//! - [`config_file`]: bracketed config stanzas such as
//!   `[server] host=localhost port=5672`
//!
//! Both are built once per process and shared through [`Example::get`].

use crate::charset::{CharSet, ALPHANUMERIC};
use crate::engine::MatchOutcome;
use crate::error::{GrammarError, MatchError};
use crate::grammar::{Grammar, GrammarBuilder};
use crate::node::{NodeId, END_OF_INPUT};
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;

/// A built grammar together with its start rule
#[derive(Debug, Clone)]
pub struct ExampleGrammar {
    pub grammar: Grammar,
    pub root: NodeId,
}

impl ExampleGrammar {
    pub fn run(&self, input: &str) -> Result<MatchOutcome, MatchError> {
        self.grammar.run(self.root, input)
    }

    pub fn render(&self) -> String {
        self.grammar.render(self.root)
    }
}

/// Endpoint URL grammar
///
/// `[scheme "://"] [username ["/" password] "@"] endpoint ("," endpoint)*`
/// where `endpoint = [protocol ":"] host [":" port]`.
pub fn endpoint_url() -> Result<ExampleGrammar, GrammarError> {
    let mut g = GrammarBuilder::new();
    let classes = g.standard_classes();

    let hostchar = g.one_of(ALPHANUMERIC | CharSet::from("_-.%~"));
    g.with_name(hostchar, "hostchar")?;
    let idchar = g.none_of("/:@ \t\n");
    g.with_name(idchar, "idchar")?;

    let colon = g.literal_char(':');
    let slash = g.literal_char('/');
    let at = g.literal_char('@');
    let comma = g.literal_char(',');

    // amqps must be tried first, amqp is its prefix
    let amqps = g.literal("amqps");
    let amqp = g.literal("amqp");
    let scheme = g.alternation([amqps, amqp])?;
    g.with_tag(scheme, "scheme")?;
    g.with_name(scheme, "scheme")?;
    let scheme_term = g.literal("://");
    let scheme_part = g.sequence([scheme, scheme_term])?;
    let opt_scheme = g.optional(scheme_part)?;

    let username = g.one_or_more(idchar)?;
    g.with_tag(username, "username")?;
    g.with_name(username, "username")?;
    let password = g.one_or_more(idchar)?;
    g.with_tag(password, "password")?;
    g.with_name(password, "password")?;
    let pass_part = g.sequence([slash, password])?;
    let opt_pass = g.optional(pass_part)?;
    let user_part = g.sequence([username, opt_pass, at])?;
    g.with_name(user_part, "userinfo")?;
    let opt_user = g.optional(user_part)?;

    let tcp = g.literal("tcp");
    let ssl = g.literal("ssl");
    let rdma = g.literal("rdma");
    let protocol = g.alternation([tcp, ssl, rdma])?;
    g.with_tag(protocol, "protocol")?;
    g.with_name(protocol, "protocol")?;
    let proto_part = g.sequence([protocol, colon])?;
    let opt_proto = g.optional(proto_part)?;

    let host = g.one_or_more(hostchar)?;
    g.with_tag(host, "host")?;
    g.with_name(host, "host")?;
    let port = g.repeat(classes.digit, 1, Some(5))?;
    g.with_tag(port, "port")?;
    g.with_name(port, "port")?;
    let port_part = g.sequence([colon, port])?;
    let opt_port = g.optional(port_part)?;

    let endpoint = g.sequence([opt_proto, host, opt_port])?;
    g.with_tag(endpoint, "endpoint")?;
    g.with_name(endpoint, "endpoint")?;
    let next_endpoint = g.sequence([comma, endpoint])?;
    let more_endpoints = g.zero_or_more(next_endpoint)?;
    let endpoints = g.sequence([endpoint, more_endpoints])?;
    g.with_name(endpoints, "endpoints")?;

    let url = g.sequence([opt_scheme, opt_user, endpoints, END_OF_INPUT])?;
    g.with_name(url, "url")?;

    Ok(ExampleGrammar {
        grammar: g.build()?,
        root: url,
    })
}

/// Config stanza grammar
///
/// `("[" identifier "]" definition (ws+ definition)*)* $`
/// where `definition = identifier ws* "=" ws* identifier`.
pub fn config_file() -> Result<ExampleGrammar, GrammarError> {
    let mut g = GrammarBuilder::new();
    let classes = g.standard_classes();

    let idchar = g.one_of(ALPHANUMERIC | CharSet::from("_-.%~/"));
    g.with_name(idchar, "idchar")?;
    let identifier = g.one_or_more(idchar)?;
    g.with_tag(identifier, "identifier")?;
    g.with_name(identifier, "identifier")?;

    let ows = g.zero_or_more(classes.ws)?;
    let rws = g.one_or_more(classes.ws)?;

    let open = g.literal_char('[');
    let close = g.literal_char(']');
    let equals = g.literal_char('=');

    let header = g.sequence([open, identifier, close])?;
    g.with_tag(header, "header")?;
    g.with_name(header, "header")?;

    let definition = g.sequence([identifier, ows, equals, ows, identifier])?;
    g.with_tag(definition, "definition")?;
    g.with_name(definition, "definition")?;
    let next_definition = g.sequence([rws, definition])?;
    let more_definitions = g.zero_or_more(next_definition)?;
    let definitions = g.sequence([definition, more_definitions])?;
    g.with_name(definitions, "definitions")?;

    let stanza = g.sequence([header, ows, definitions, ows])?;
    g.with_tag(stanza, "stanza")?;
    g.with_name(stanza, "stanza")?;
    let stanzas = g.zero_or_more(stanza)?;
    let config = g.sequence([ows, stanzas, END_OF_INPUT])?;
    g.with_name(config, "config")?;

    Ok(ExampleGrammar {
        grammar: g.build()?,
        root: config,
    })
}

/// The bundled example grammars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Example {
    EndpointUrl,
    ConfigFile,
}

static ENDPOINT_URL: Lazy<Result<ExampleGrammar, GrammarError>> = Lazy::new(endpoint_url);
static CONFIG_FILE: Lazy<Result<ExampleGrammar, GrammarError>> = Lazy::new(config_file);

impl Example {
    pub const ALL: [Example; 2] = [Example::EndpointUrl, Example::ConfigFile];

    pub fn name(self) -> &'static str {
        match self {
            Example::EndpointUrl => "url",
            Example::ConfigFile => "config",
        }
    }

    /// Shared, lazily built instance of this grammar
    pub fn get(self) -> Result<&'static ExampleGrammar, GrammarError> {
        let built = match self {
            Example::EndpointUrl => &*ENDPOINT_URL,
            Example::ConfigFile => &*CONFIG_FILE,
        };
        built.as_ref().map_err(Clone::clone)
    }
}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognised example grammar name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown grammar '{0}', expected one of: url, config")]
pub struct UnknownExample(pub String);

impl FromStr for Example {
    type Err = UnknownExample;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Example::ALL
            .into_iter()
            .find(|example| example.name() == s)
            .ok_or_else(|| UnknownExample(s.to_string()))
    }
}
