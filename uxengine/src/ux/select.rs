use super::{EnrollmentChannel, PrivacySandboxUx};
use crate::consent::ConsentState;
use crate::flags::FlagState;

/// First candidate, in iteration order, that satisfies `pred`
pub fn first_match<I, T, F>(candidates: I, mut pred: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> bool,
{
    candidates.into_iter().find(|it| pred(it))
}

/// The first eligible UX, [PrivacySandboxUx::Unsupported] if none are
pub fn select_ux(state: &ConsentState, flags: &dyn FlagState) -> PrivacySandboxUx {
    first_match(PrivacySandboxUx::ALL, |ux| ux.is_eligible(state, flags)).unwrap_or_else(|| {
        log::debug!("no ux eligible, falling back to unsupported");
        PrivacySandboxUx::Unsupported
    })
}

/// The first eligible channel of `ux`, if any
pub fn select_channel(
    ux: PrivacySandboxUx,
    state: &ConsentState,
    flags: &dyn FlagState,
) -> Option<EnrollmentChannel> {
    first_match(ux.channels(), |ch| ch.is_eligible(state, flags))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::flags::{
        StaticFlags, KEY_ADSERVICES_ENABLED, KEY_GA_UX_FEATURE_ENABLED, KEY_RVC_UX_ENABLED,
        KEY_U18_UX_ENABLED,
    };
    use crate::testing::MockFlags;
    use crate::ux::channel::{BetaChannel, GaChannel};
    use mockall::predicate::eq;
    use rstest::*;

    fn expect_flag(flags: &mut MockFlags, key: &'static str, value: bool, times: usize) {
        flags
            .expect_get_flag()
            .with(eq(key))
            .times(times)
            .return_const(value);
    }

    #[fixture]
    fn entry_point_state() -> ConsentState {
        let mut state = ConsentState::default();
        state.entry_point_enabled = true;
        state
    }

    #[test]
    fn test_first_match() {
        assert_eq!(first_match(vec![1, 2, 3, 4], |v| v % 2 == 0), Some(2));
        assert_eq!(first_match(Vec::<u32>::new(), |_| true), None);
    }

    #[rstest]
    fn test_adservices_disabled(entry_point_state: ConsentState) {
        let mut flags = MockFlags::new();
        expect_flag(&mut flags, KEY_ADSERVICES_ENABLED, false, 1);
        assert_eq!(
            select_ux(&entry_point_state, &flags),
            PrivacySandboxUx::Unsupported
        );
    }

    #[test]
    fn test_entry_point_disabled() {
        let mut flags = MockFlags::new();
        expect_flag(&mut flags, KEY_ADSERVICES_ENABLED, true, 1);
        let mut state = ConsentState::default();
        state.adult_account = true;
        assert_eq!(select_ux(&state, &flags), PrivacySandboxUx::Unsupported);
    }

    #[rstest]
    fn test_u18_precedence(mut entry_point_state: ConsentState) {
        let mut flags = MockFlags::new();
        expect_flag(&mut flags, KEY_ADSERVICES_ENABLED, true, 1);
        expect_flag(&mut flags, KEY_U18_UX_ENABLED, true, 1);
        // Adult too, U18 still wins and GA is never consulted
        entry_point_state.u18_account = true;
        entry_point_state.adult_account = true;
        assert_eq!(
            select_ux(&entry_point_state, &flags),
            PrivacySandboxUx::U18
        );
    }

    #[rstest]
    fn test_beta(mut entry_point_state: ConsentState) {
        let mut flags = MockFlags::new();
        expect_flag(&mut flags, KEY_ADSERVICES_ENABLED, true, 1);
        expect_flag(&mut flags, KEY_U18_UX_ENABLED, false, 1);
        expect_flag(&mut flags, KEY_RVC_UX_ENABLED, false, 1);
        expect_flag(&mut flags, KEY_GA_UX_FEATURE_ENABLED, false, 2);
        entry_point_state.adult_account = true;
        assert_eq!(
            select_ux(&entry_point_state, &flags),
            PrivacySandboxUx::Beta
        );
    }

    #[rstest]
    fn test_nothing_eligible(entry_point_state: ConsentState) {
        let mut flags = StaticFlags::new();
        flags.set(KEY_ADSERVICES_ENABLED, true);
        // Neither adult nor U18
        assert_eq!(
            select_ux(&entry_point_state, &flags),
            PrivacySandboxUx::Unsupported
        );
    }

    #[rstest]
    fn test_rvc_over_ga(mut entry_point_state: ConsentState) {
        let mut flags = StaticFlags::new();
        flags
            .set(KEY_ADSERVICES_ENABLED, true)
            .set(KEY_RVC_UX_ENABLED, true)
            .set(KEY_GA_UX_FEATURE_ENABLED, true);
        entry_point_state.adult_account = true;
        assert_eq!(select_ux(&entry_point_state, &flags), PrivacySandboxUx::Rvc);
    }

    #[rstest]
    fn test_select_channel(entry_point_state: ConsentState) {
        let flags = StaticFlags::new();
        assert_eq!(
            select_channel(PrivacySandboxUx::Ga, &entry_point_state, &flags),
            Some(EnrollmentChannel::Ga(GaChannel::FirstConsentNotification))
        );
        assert_eq!(
            select_channel(PrivacySandboxUx::Beta, &entry_point_state, &flags),
            Some(EnrollmentChannel::Beta(BetaChannel::FirstConsentNotification))
        );
        assert_eq!(
            select_channel(PrivacySandboxUx::Unsupported, &entry_point_state, &flags),
            None
        );
    }
}
