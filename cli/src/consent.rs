use std::str::FromStr;

use clap::{self, ArgGroup, Args};

use uxengine::{ApiType, ConsentStore, Context};

use crate::utils::{open_store, write_state};

/// Which consent a decision applies to, `all` covers every API and the
/// legacy consent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTarget(Option<ApiType>);

impl FromStr for ApiTarget {
    type Err = uxengine::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self(None));
        }
        Ok(Self(Some(ApiType::from_str(s)?)))
    }
}

#[derive(Args)]
#[command(group(ArgGroup::new("decision").required(true).args(["given", "revoked"])))]
pub struct Consent {
    /// The API the decision is for: topics, fledge, measurement or all
    #[arg(short, long, default_value = "all")]
    api: ApiTarget,

    /// The user gave consent
    #[arg(long, action = clap::ArgAction::SetTrue)]
    given: bool,

    /// The user revoked consent
    #[arg(long, action = clap::ArgAction::SetTrue)]
    revoked: bool,
}

impl Consent {
    pub fn run(&self, ctx: &dyn Context) -> anyhow::Result<()> {
        let store = open_store(ctx)?;
        let state = store.record_user_consent(self.api.0, self.given)?;
        write_state(&mut std::io::stdout().lock(), &state)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;
    use rstest::*;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        consent: Consent,
    }

    #[rstest]
    #[case("all", Some(ApiTarget(None)))]
    #[case("ALL", Some(ApiTarget(None)))]
    #[case("topics", Some(ApiTarget(Some(ApiType::Topics))))]
    #[case("Measurement", Some(ApiTarget(Some(ApiType::Measurement))))]
    #[case("cookies", None)]
    fn test_api_target(#[case] raw: &str, #[case] expected: Option<ApiTarget>) {
        assert_eq!(ApiTarget::from_str(raw).ok(), expected);
    }

    #[test]
    fn test_decision_required() {
        assert!(Wrapper::try_parse_from(["consent"]).is_err());
        assert!(Wrapper::try_parse_from(["consent", "--given", "--revoked"]).is_err());

        let w = Wrapper::try_parse_from(["consent", "--api", "fledge", "--revoked"])
            .expect("parse");
        assert_eq!(w.consent.api, ApiTarget(Some(ApiType::Fledge)));
        assert!(!w.consent.given);
        assert!(w.consent.revoked);

        let w = Wrapper::try_parse_from(["consent", "--given"]).expect("parse");
        assert_eq!(w.consent.api, ApiTarget(None));
        assert!(w.consent.given);
    }
}
