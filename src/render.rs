//! Output formats for a loaded [`ServerConfig`].
//!
//! `config.inc.php` is what phpMyAdmin reads at startup, so the PHP form is
//! the one meant for deployment. By default it reads the secret from the
//! environment at PHP runtime; the literal is only written on request.
//! JSON is for inspection and never carries the secret.

use anyhow::Context;
use secrecy::ExposeSecret;

use crate::config::{ConfigView, ServerConfig, BASE_PATH, BLOWFISH_SECRET_VAR};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Php,
    Json,
}

enum PhpValue<'a> {
    Str(&'a str),
    Int(u32),
    Bool(bool),
    /// Emitted as-is, evaluated by PHP.
    Expr(String),
}

impl std::fmt::Display for PhpValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhpValue::Str(s) => write!(f, "{}", php_quote(s)),
            PhpValue::Int(i) => write!(f, "{}", i),
            PhpValue::Bool(b) => write!(f, "{}", b),
            PhpValue::Expr(e) => f.write_str(e),
        }
    }
}

fn php_quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn assign(out: &mut String, path: &[&str], value: PhpValue<'_>) {
    out.push_str("$cfg");
    for key in path {
        out.push_str(&format!("[{}]", php_quote(key)));
    }
    out.push_str(&format!(" = {};\n", value));
}

/// Where the PHP output gets the shared secret from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// Read with `getenv` when phpMyAdmin starts, guarded like the loader.
    Environment,
    /// Write the loaded value into the file.
    Inline,
}

fn php_secret_guard(out: &mut String) {
    out.push_str(&format!(
        "$blowfish_secret = getenv({});\n",
        php_quote(BLOWFISH_SECRET_VAR)
    ));
    out.push_str("if (empty($blowfish_secret)) {\n");
    out.push_str(&format!(
        "    die({});\n",
        php_quote(
            &ConfigError::MissingSecret {
                var: BLOWFISH_SECRET_VAR
            }
            .to_string()
        )
    ));
    out.push_str("}\n\n");
}

pub fn render_php(config: &ServerConfig, secret: SecretSource) -> String {
    let mut out = String::from("<?php\n\n");
    if secret == SecretSource::Environment {
        php_secret_guard(&mut out);
    }

    for (index, server) in &config.servers {
        let port = server.port.to_string();
        let entries = [
            ("auth_type", PhpValue::Str(server.auth_type.as_str())),
            ("host", PhpValue::Str(&server.host)),
            ("port", PhpValue::Str(&port)),
            ("compress", PhpValue::Bool(server.compress)),
            ("AllowNoPassword", PhpValue::Bool(server.allow_no_password)),
            ("controlhost", PhpValue::Str(&server.control.host)),
            ("controlport", PhpValue::Str(&server.control.port)),
            ("controluser", PhpValue::Str(&server.control.user)),
            ("controlpass", PhpValue::Str(&server.control.pass)),
        ];
        for (key, value) in entries {
            out.push_str(&format!(
                "$cfg['Servers'][{}][{}] = {};\n",
                index,
                php_quote(key),
                value
            ));
        }
        out.push('\n');
    }

    assign(&mut out, &["UploadDir"], PhpValue::Str(&config.upload_dir));
    assign(&mut out, &["SaveDir"], PhpValue::Str(&config.save_dir));
    let secret_value = match secret {
        SecretSource::Environment => PhpValue::Expr("$blowfish_secret".to_string()),
        SecretSource::Inline => PhpValue::Str(config.blowfish_secret.expose_secret()),
    };
    assign(&mut out, &["blowfish_secret"], secret_value);
    assign(&mut out, &["DefaultLang"], PhpValue::Str(&config.default_lang));
    assign(&mut out, &["ServerDefault"], PhpValue::Int(config.server_default));
    assign(&mut out, &["MaxRows"], PhpValue::Int(config.max_rows));
    assign(&mut out, &["ExecTimeLimit"], PhpValue::Int(config.exec_time_limit));
    assign(
        &mut out,
        &["SendErrorReports"],
        PhpValue::Str(config.send_error_reports.as_str()),
    );
    assign(&mut out, &["ThemeDefault"], PhpValue::Str(&config.theme_default));
    assign(
        &mut out,
        &["LoginCookieValidity"],
        PhpValue::Int(config.login_cookie_validity),
    );
    assign(
        &mut out,
        &["AllowThirdPartyFraming"],
        PhpValue::Bool(config.allow_third_party_framing),
    );
    assign(
        &mut out,
        &["AllowArbitraryServer"],
        PhpValue::Bool(config.allow_arbitrary_server),
    );
    assign(
        &mut out,
        &["NavigationTreeEnableGrouping"],
        PhpValue::Bool(config.navigation_tree_enable_grouping),
    );
    assign(&mut out, &["ShowStats"], PhpValue::Bool(config.show_stats));
    assign(&mut out, &["ShowPhpInfo"], PhpValue::Bool(config.show_php_info));
    assign(
        &mut out,
        &["Import", "charset"],
        PhpValue::Str(&config.import.charset),
    );
    assign(
        &mut out,
        &["Export", "charset"],
        PhpValue::Str(&config.export.charset),
    );
    assign(
        &mut out,
        &["Export", "method"],
        PhpValue::Str(config.export.method.as_str()),
    );

    // Host is only known per request, so leave it to PHP.
    assign(
        &mut out,
        &["PmaAbsoluteUri"],
        PhpValue::Expr(format!(
            "'http://' . $_SERVER['HTTP_HOST'] . {}",
            php_quote(BASE_PATH)
        )),
    );

    out
}

pub fn render_json(config: &ServerConfig, host: Option<&str>) -> anyhow::Result<String> {
    serde_json::to_string_pretty(&ConfigView::new(config, host))
        .context("Failed to serialize configuration")
}

pub fn render(
    config: &ServerConfig,
    format: Format,
    host: Option<&str>,
    secret: SecretSource,
) -> anyhow::Result<String> {
    match format {
        Format::Php => Ok(render_php(config, secret)),
        Format::Json => render_json(config, host),
    }
}
