/// Screens and the transition table between them.
///
/// ## Transition Table
/// ┌────────────────────────────┬──────────────────┬──────────────────┐
/// │ From                        │ Trigger          │ To               │
/// ├────────────────────────────┼──────────────────┼──────────────────┤
/// │ Title                       │ Continue         │ MainMenu         │
/// │ MainMenu                    │ Play             │ Briefing         │
/// │ MainMenu                    │ Instructions     │ Instructions     │
/// │ MainMenu                    │ Credits          │ Credits          │
/// │ MainMenu                    │ Leaderboard      │ Leaderboard      │
/// │ MainMenu                    │ Quit             │ (exit)           │
/// │ Instructions                │ Back             │ MainMenu         │
/// │ Credits                     │ CreditsDetail    │ CreditsDetail    │
/// │ Credits                     │ References       │ References       │
/// │ Credits                     │ Back             │ MainMenu         │
/// │ CreditsDetail / References  │ Back             │ Credits          │
/// │ Leaderboard                 │ Back             │ MainMenu         │
/// │ Briefing                    │ BriefingDone     │ Play             │
/// │ Play                        │ RoundOver(score) │ Losing(score)    │
/// │ Losing                      │ Back             │ MainMenu         │
/// │ any                         │ HostQuit         │ (exit)           │
/// └────────────────────────────┴──────────────────┴──────────────────┘
///
/// Anything not in the table has no transition: a screen that reports
/// such a trigger is a bug.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Title,
    MainMenu,
    Instructions,
    Credits,
    CreditsDetail,
    References,
    Leaderboard,
    Briefing,
    Play,
    Losing { score: u32 },
}

/// What made a screen give up control.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Trigger {
    Continue,
    Play,
    Instructions,
    Credits,
    Leaderboard,
    Quit,
    Back,
    CreditsDetail,
    References,
    BriefingDone,
    RoundOver { score: u32 },
    /// The host asked the program to stop (e.g. Ctrl+C).
    HostQuit,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Next {
    Go(Screen),
    Exit,
}

impl Screen {
    pub fn on(self, trigger: Trigger) -> Option<Next> {
        use Next::{Exit, Go};
        use Screen as S;
        use Trigger as T;

        let next = match (self, trigger) {
            (_, T::HostQuit) => Exit,

            (S::Title, T::Continue) => Go(S::MainMenu),

            (S::MainMenu, T::Play) => Go(S::Briefing),
            (S::MainMenu, T::Instructions) => Go(S::Instructions),
            (S::MainMenu, T::Credits) => Go(S::Credits),
            (S::MainMenu, T::Leaderboard) => Go(S::Leaderboard),
            (S::MainMenu, T::Quit) => Exit,

            (S::Credits, T::CreditsDetail) => Go(S::CreditsDetail),
            (S::Credits, T::References) => Go(S::References),

            (S::CreditsDetail | S::References, T::Back) => Go(S::Credits),
            (S::Instructions | S::Credits | S::Leaderboard | S::Losing { .. }, T::Back) => {
                Go(S::MainMenu)
            }

            (S::Briefing, T::BriefingDone) => Go(S::Play),
            (S::Play, T::RoundOver { score }) => Go(S::Losing { score }),

            _ => return None,
        };
        Some(next)
    }
}
