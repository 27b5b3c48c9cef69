use chrono_tz::Tz;
use serde::Serialize;

/// Immigration channels a terminal can route arriving passengers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Queue {
    EGates,
    EeaDesk,
    NonEeaDesk,
    FastTrack,
}

impl Queue {
    pub const fn ordered() -> [Self; 4] {
        [Self::EGates, Self::EeaDesk, Self::NonEeaDesk, Self::FastTrack]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EGates => "e-Gates",
            Self::EeaDesk => "EEA",
            Self::NonEeaDesk => "Non-EEA",
            Self::FastTrack => "Fast Track",
        }
    }
}

/// Long-run share of a terminal's arriving passengers per queue. Used for
/// the terminal-average split tier when no better source exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueRatios {
    pub egates: f64,
    pub eea_desk: f64,
    pub non_eea_desk: f64,
    pub fast_track: f64,
}

impl QueueRatios {
    pub fn share(&self, queue: Queue) -> f64 {
        match queue {
            Queue::EGates => self.egates,
            Queue::EeaDesk => self.eea_desk,
            Queue::NonEeaDesk => self.non_eea_desk,
            Queue::FastTrack => self.fast_track,
        }
    }
}

pub const DEFAULT_AVERAGE_RATIOS: QueueRatios = QueueRatios {
    egates: 0.25,
    eea_desk: 0.73,
    non_eea_desk: 0.02,
    fast_track: 0.0,
};

const FAST_TRACK_AVERAGE_RATIOS: QueueRatios = QueueRatios {
    egates: 0.25,
    eea_desk: 0.68,
    non_eea_desk: 0.02,
    fast_track: 0.05,
};

const STANDARD_QUEUES: &[Queue] = &[Queue::EGates, Queue::EeaDesk, Queue::NonEeaDesk];

const FAST_TRACK_QUEUES: &[Queue] = &[
    Queue::EGates,
    Queue::EeaDesk,
    Queue::NonEeaDesk,
    Queue::FastTrack,
];

#[derive(Debug, Clone, Copy)]
pub struct TerminalConfig {
    pub name: &'static str,
    pub queues: &'static [Queue],
    pub average_ratios: QueueRatios,
}

impl TerminalConfig {
    pub fn has_queue(&self, queue: Queue) -> bool {
        self.queues.contains(&queue)
    }
}

pub const DEFAULT_TERMINAL: TerminalConfig = TerminalConfig {
    name: "T1",
    queues: STANDARD_QUEUES,
    average_ratios: DEFAULT_AVERAGE_RATIOS,
};

#[derive(Debug, Clone, Copy)]
pub struct PortConfig {
    pub code: &'static str,
    pub name: &'static str,
    pub timezone: Tz,
    pub terminals: &'static [TerminalConfig],
}

impl PortConfig {
    /// Unknown terminal names fall back to the standard queue set.
    pub fn terminal(&self, name: &str) -> &TerminalConfig {
        self.terminals
            .iter()
            .find(|terminal| terminal.name.eq_ignore_ascii_case(name))
            .unwrap_or(&DEFAULT_TERMINAL)
    }
}

const fn standard_terminal(name: &'static str) -> TerminalConfig {
    TerminalConfig {
        name,
        queues: STANDARD_QUEUES,
        average_ratios: DEFAULT_AVERAGE_RATIOS,
    }
}

const fn fast_track_terminal(name: &'static str) -> TerminalConfig {
    TerminalConfig {
        name,
        queues: FAST_TRACK_QUEUES,
        average_ratios: FAST_TRACK_AVERAGE_RATIOS,
    }
}

static STN_TERMINALS: [TerminalConfig; 1] = [standard_terminal("T1")];

static LHR_TERMINALS: [TerminalConfig; 4] = [
    fast_track_terminal("T2"),
    fast_track_terminal("T3"),
    fast_track_terminal("T4"),
    fast_track_terminal("T5"),
];

static MAN_TERMINALS: [TerminalConfig; 3] = [
    standard_terminal("T1"),
    standard_terminal("T2"),
    standard_terminal("T3"),
];

static PORTS: [PortConfig; 3] = [
    PortConfig {
        code: "STN",
        name: "London Stansted",
        timezone: chrono_tz::Europe::London,
        terminals: &STN_TERMINALS,
    },
    PortConfig {
        code: "LHR",
        name: "London Heathrow",
        timezone: chrono_tz::Europe::London,
        terminals: &LHR_TERMINALS,
    },
    PortConfig {
        code: "MAN",
        name: "Manchester",
        timezone: chrono_tz::Europe::London,
        terminals: &MAN_TERMINALS,
    },
];

static FALLBACK_PORT: PortConfig = PortConfig {
    code: "STN",
    name: "London Stansted",
    timezone: chrono_tz::Europe::London,
    terminals: &STN_TERMINALS,
};

pub fn port_config(code: &str) -> &'static PortConfig {
    PORTS
        .iter()
        .find(|port| port.code.eq_ignore_ascii_case(code))
        .unwrap_or(&FALLBACK_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_falls_back() {
        assert_eq!(port_config("lhr").code, "LHR");
        assert_eq!(port_config("ZZZ").code, "STN");
    }

    #[test]
    fn default_terminal_has_no_fast_track_queue() {
        let terminal = port_config("STN").terminal("T1");
        assert!(!terminal.has_queue(Queue::FastTrack));
        assert!(terminal.has_queue(Queue::EGates));
    }

    #[test]
    fn heathrow_terminals_route_fast_track() {
        let terminal = port_config("LHR").terminal("T5");
        assert!(terminal.has_queue(Queue::FastTrack));
    }

    #[test]
    fn unknown_terminal_degrades_to_the_standard_queue_set() {
        let terminal = port_config("STN").terminal("T9");
        assert_eq!(terminal.queues, STANDARD_QUEUES);
    }
}
