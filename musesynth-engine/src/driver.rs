// muse-synth -- pitched music from rapidly triggered drums
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Turning the event list into score actions, one event at a time.

use std::rc::Rc;

use log::{debug, info, warn};
use musesynth_core::duration;
use musesynth_core::error::{Error, Result};
use musesynth_core::event::{DrumPitch, Event, NoteRequest, RestRequest};

use crate::action::{Action, ScoreSink};
use crate::config::Config;
use crate::glide::TempoSegment;
use crate::timer::{self, ScoreContext};
use crate::voices::{self, VoicePart};

/// Preference controlling whether tempo changes within a note are labelled.
pub const DISPLAY_TEMPOS: &str = "displaytempos";

/// The drum each voice is played on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceTable {
    instruments: Vec<DrumPitch>,
}

impl VoiceTable {
    pub fn new(count: usize, instrument: DrumPitch) -> Self {
        VoiceTable {
            instruments: vec![instrument; count],
        }
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn instrument(&self, voice: usize) -> Option<DrumPitch> {
        self.instruments.get(voice).copied()
    }

    pub fn instruments(&self) -> &[DrumPitch] {
        &self.instruments
    }

    fn assign(&mut self, voice: usize, pitch: DrumPitch) -> Result<()> {
        let voices = self.len();
        let slot = self
            .instruments
            .get_mut(voice)
            .ok_or(Error::UnknownVoice { voice, voices })?;
        *slot = pitch;
        Ok(())
    }

    fn resize(&mut self, count: usize, instrument: DrumPitch) {
        self.instruments.resize(count, instrument);
    }
}

/// Everything the events processed so far have established.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreState {
    context: ScoreContext,
    voices: Option<VoiceTable>,
    /// Notated length of the score so far, in 128th notes.
    elapsed_units: i64,
    display_tempos: bool,
    /// Whether a note or rest has been processed, fixing the number of voices.
    started: bool,
}

impl ScoreState {
    pub fn new(display_tempos: bool) -> Self {
        ScoreState {
            context: ScoreContext::default(),
            voices: None,
            elapsed_units: 0,
            display_tempos,
            started: false,
        }
    }

    pub fn context(&self) -> &ScoreContext {
        &self.context
    }

    pub fn voices(&self) -> Option<&VoiceTable> {
        self.voices.as_ref()
    }

    pub fn elapsed_units(&self) -> i64 {
        self.elapsed_units
    }

    pub fn display_tempos(&self) -> bool {
        self.display_tempos
    }

    fn voice_table(&self) -> Result<&VoiceTable> {
        self.voices
            .as_ref()
            .ok_or(Error::MissingVoiceConfiguration {})
    }
}

/// Processes events in order and writes the resulting actions to a sink.
pub struct Driver<S> {
    config: Config,
    state: ScoreState,
    sink: S,
}

impl<S: ScoreSink> Driver<S> {
    pub fn new(config: Config, sink: S) -> Self {
        Driver {
            state: ScoreState::new(config.display_tempos),
            config,
            sink,
        }
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    pub fn process(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::Tempo(bpm) => {
                self.state.context.tempo = positive("tempo", *bpm)?;
            }
            Event::Tuning(hz) => {
                self.state.context.tuning = positive("tuning", *hz)?;
            }
            Event::Voices(count) => self.declare_voices(*count)?,
            Event::Instrument { voice, pitch } => {
                self.state
                    .voices
                    .as_mut()
                    .ok_or(Error::MissingVoiceConfiguration {})?
                    .assign(*voice, *pitch)?;
            }
            Event::Preference { name, enabled } => self.set_preference(name, *enabled),
            Event::Note(note) => self.note(note)?,
            Event::Rest(rest) => self.rest(rest)?,
        }
        Ok(())
    }

    fn declare_voices(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(Error::InvalidVoiceCount { count });
        }
        let instrument = self.config.default_instrument;
        match &mut self.state.voices {
            Some(table) if self.state.started => {
                if table.len() != count {
                    return Err(Error::VoiceCountFixed {
                        declared: table.len(),
                        requested: count,
                    });
                }
            }
            Some(table) => table.resize(count, instrument),
            None => self.state.voices = Some(VoiceTable::new(count, instrument)),
        }
        Ok(())
    }

    fn set_preference(&mut self, name: &str, enabled: bool) {
        if name == DISPLAY_TEMPOS {
            self.state.display_tempos = enabled;
        } else {
            warn!("ignoring unknown preference {:?}", name);
        }
    }

    fn tempo_label(&self, bpm: f64) -> Option<String> {
        if self.state.display_tempos {
            Some(format!("{:.2} bpm", bpm))
        } else {
            None
        }
    }

    fn note(&mut self, note: &NoteRequest) -> Result<()> {
        let duration = duration::validate(note.duration)?;
        let table = self.state.voice_table()?;
        let voicing = voices::allocate(
            note.harmony.as_ref(),
            table.len(),
            self.config.default_division,
        )?;
        let division = voicing.lead.count();
        let context = self.state.context;

        let timing = timer::resolve_note(&note.name, duration, division, &context)?;
        let parts: Rc<[VoicePart]> = voicing.parts.into();
        let segment = match &note.glide {
            Some(target) => {
                let goal = timer::resolve_note(target, duration, division, &context)?;
                debug!(
                    "{} -> {}: {:.3} Hz -> {:.3} Hz, {:.3} bpm -> {:.3} bpm",
                    note.name, target, timing.frequency, goal.frequency, timing.tempo, goal.tempo
                );
                TempoSegment::gliding(
                    timing.length.min(goal.length),
                    timing.tempo,
                    goal.tempo,
                    parts,
                )
            }
            None => {
                debug!(
                    "{}: {:.3} Hz at {:.3} bpm, {} tuplets",
                    note.name, timing.frequency, timing.tempo, timing.length
                );
                TempoSegment::steady(timing.length, timing.tempo, parts)
            }
        };
        self.state.started = true;

        if segment.length <= 0 {
            warn!(
                "note {} of length {} is too short to be written at {:.3} bpm",
                note.name, duration, timing.tempo
            );
            return Ok(());
        }

        let steps = segment.expand();
        let instruments = self.state.voice_table()?.instruments().to_vec();
        let mut current_tempo = None;
        for step in &steps {
            if current_tempo != Some(step.tempo) {
                let label = match current_tempo {
                    None => Some(note.name.clone()),
                    Some(_) => self.tempo_label(step.tempo),
                };
                self.sink.emit(Action::SetTempo {
                    bpm: step.tempo,
                    label,
                });
                current_tempo = Some(step.tempo);
            }
            for (voice, part) in segment.parts.iter().enumerate() {
                part.emit(voice, instruments[voice], &mut self.sink);
            }
        }
        self.state.elapsed_units += steps.len() as i64;
        Ok(())
    }

    fn rest(&mut self, rest: &RestRequest) -> Result<()> {
        let duration = duration::validate(rest.duration)?;
        let voices = self.state.voice_table()?.len();
        self.state.started = true;

        let units = duration::units(duration)?;
        if units < 1 {
            warn!("rest of length {} is shorter than a 128th note", duration);
            return Ok(());
        }

        self.sink.emit(Action::SetTempo {
            bpm: self.state.context.tempo,
            label: None,
        });
        for symbol in duration::decompose_rest(units) {
            for voice in 0..voices {
                self.sink.emit(Action::EmitRest {
                    duration: symbol,
                    voice,
                });
            }
        }
        self.state.elapsed_units += units;
        Ok(())
    }

    /// Close the score and hand back the sink.
    pub fn finish(mut self) -> S {
        let units = self.state.elapsed_units;
        info!(
            "score is {} long ({} 128th notes)",
            duration::fraction(units),
            units
        );
        self.sink.emit(Action::SetMeasureLength { units });
        self.sink
    }
}

fn positive(setting: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(Error::NonPositiveSetting { setting, value })
    }
}

/// Run all `events` and collect the resulting actions.
pub fn synthesize<'a, I>(events: I, config: Config) -> Result<Vec<Action>>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut driver = Driver::new(config, Vec::new());
    for event in events {
        driver.process(event)?;
    }
    Ok(driver.finish())
}

#[cfg(test)]
mod test {
    use super::*;
    use musesynth_core::duration::NoteValue;
    use musesynth_core::event::Harmony;
    use musesynth_core::rational::Rational;

    fn note(name: &str, duration: Rational) -> Event {
        Event::Note(NoteRequest::new(name, duration))
    }

    fn rest(duration: Rational) -> Event {
        Event::Rest(RestRequest { duration })
    }

    fn run(events: &[Event]) -> Result<Vec<Action>> {
        synthesize(events, Config::default())
    }

    fn tempos(actions: &[Action]) -> Vec<(f64, Option<String>)> {
        actions
            .iter()
            .filter_map(|action| match action {
                Action::SetTempo { bpm, label } => Some((*bpm, label.clone())),
                _ => None,
            })
            .collect()
    }

    fn measure(actions: &[Action]) -> i64 {
        match actions.last() {
            Some(Action::SetMeasureLength { units }) => *units,
            other => panic!("expected a measure length at the end, got {:?}", other),
        }
    }

    #[test]
    fn voices_must_be_declared() {
        let quarter = Rational::new(1, 4);
        assert_eq!(
            run(&[note("C4", quarter)]),
            Err(Error::MissingVoiceConfiguration {})
        );
        assert_eq!(run(&[rest(quarter)]), Err(Error::MissingVoiceConfiguration {}));
        assert_eq!(
            run(&[Event::Instrument { voice: 0, pitch: 38 }]),
            Err(Error::MissingVoiceConfiguration {})
        );
        assert_eq!(run(&[Event::Voices(0)]), Err(Error::InvalidVoiceCount { count: 0 }));
    }

    #[test]
    fn single_quarter_note() {
        let actions = run(&[Event::Voices(1), note("C4", Rational::new(1, 4))]).unwrap();
        assert_eq!(actions.len(), 1 + 33 * 4 + 1);
        match &actions[0] {
            Action::SetTempo { bpm, label } => {
                assert!((bpm - 122.637).abs() < 1e-3);
                assert_eq!(label.as_deref(), Some("C4"));
            }
            other => panic!("expected a tempo, got {:?}", other),
        }
        assert_eq!(
            actions[1],
            Action::PlayUnit {
                instrument: 41,
                duration: NoteValue::from_exponent(9).unwrap(),
                voice: 0
            }
        );
        assert_eq!(measure(&actions), 33);
    }

    #[test]
    fn rest_in_every_voice() {
        let actions = run(&[Event::Voices(2), rest(Rational::new(7, 128))]).unwrap();
        let listing: Vec<_> = actions.iter().map(|action| action.to_string()).collect();
        assert_eq!(
            listing,
            vec![
                "tempo 120.000",
                "v0 rest 32nd",
                "v1 rest 32nd",
                "v0 rest 64th",
                "v1 rest 64th",
                "v0 rest 128th",
                "v1 rest 128th",
                "measure 7/128",
            ]
        );
    }

    #[test]
    fn rest_returns_to_nominal_tempo() {
        let actions = run(&[
            Event::Voices(1),
            Event::Tempo(90.0),
            note("E4", Rational::new(1, 8)),
            rest(Rational::new(1, 4)),
        ])
        .unwrap();
        let tempos = tempos(&actions);
        assert_eq!(tempos.len(), 2);
        assert_eq!(tempos[1], (90.0, None));
    }

    #[test]
    fn harmony_with_tuplets() {
        let harmony = Harmony::new(vec![None, Some(3)]);
        let actions = run(&[
            Event::Voices(2),
            Event::Note(NoteRequest::new("A4", Rational::new(1, 4)).with_harmony(harmony)),
        ])
        .unwrap();
        assert_eq!(tempos(&actions), vec![(206.25, Some("A4".to_string()))]);
        assert_eq!(actions.len(), 1 + 55 * (4 + 5) + 1);
        let first_step: Vec<_> = actions[1..10].iter().map(|action| action.to_string()).collect();
        assert_eq!(
            first_step,
            vec![
                "v0 play 41 512th",
                "v0 play 41 512th",
                "v0 play 41 512th",
                "v0 play 41 512th",
                "v1 tuplet 3:2 256th",
                "v1 play 41 256th",
                "v1 play 41 256th",
                "v1 play 41 256th",
                "v1 end tuplet",
            ]
        );
        assert_eq!(measure(&actions), 55);
    }

    #[test]
    fn resting_voices_and_instruments() {
        let actions = run(&[
            Event::Voices(2),
            Event::Instrument { voice: 0, pitch: 38 },
            note("A4", Rational::new(1, 32)),
        ])
        .unwrap();
        assert_eq!(actions[1].to_string(), "v0 play 38 512th");
        assert_eq!(actions[5].to_string(), "v1 rest 128th");

        assert_eq!(
            run(&[Event::Voices(2), Event::Instrument { voice: 2, pitch: 38 }]),
            Err(Error::UnknownVoice { voice: 2, voices: 2 })
        );
    }

    #[test]
    fn voice_count_fixed_after_first_note() {
        let quarter = Rational::new(1, 4);
        let actions = run(&[Event::Voices(1), Event::Voices(3), rest(quarter), Event::Voices(3)]);
        assert!(actions.is_ok());

        assert_eq!(
            run(&[Event::Voices(1), note("C4", quarter), Event::Voices(2)]),
            Err(Error::VoiceCountFixed {
                declared: 1,
                requested: 2
            })
        );
    }

    #[test]
    fn tempo_changes_are_not_retroactive() {
        let quarter = Rational::new(1, 4);
        let actions = run(&[
            Event::Voices(1),
            note("C4", quarter),
            Event::Tempo(60.0),
            note("C4", quarter),
        ])
        .unwrap();
        assert_eq!(measure(&actions), 33 + 65);
    }

    #[test]
    fn glide_up_an_octave() {
        let request = NoteRequest::new("C4", Rational::new(1, 4)).with_glide("C5");
        let actions = run(&[Event::Voices(1), Event::Note(request)]).unwrap();
        let context = ScoreContext::default();
        let start = timer::resolve_note("C4", Rational::new(1, 4), 4, &context).unwrap();
        let goal = timer::resolve_note("C5", Rational::new(1, 4), 4, &context).unwrap();

        let tempos = tempos(&actions);
        assert_eq!(tempos[0], (start.tempo, Some("C4".to_string())));
        assert!(tempos[1..].iter().all(|(_, label)| label.is_none()));
        assert!(tempos.windows(2).all(|pair| pair[0].0 < pair[1].0));
        assert!(tempos
            .iter()
            .any(|(bpm, _)| (bpm - goal.tempo).abs() < 1e-6 * goal.tempo));

        // the upper half of the glide is refined, so there are more steps than outer steps
        let steps = measure(&actions);
        assert!(steps > start.length);
        let plays = actions
            .iter()
            .filter(|action| matches!(action, Action::PlayUnit { .. }))
            .count();
        assert_eq!(plays as i64, steps * 4);
    }

    #[test]
    fn display_tempos_preference() {
        let request = NoteRequest::new("C4", Rational::new(1, 8)).with_glide("G4");
        let actions = run(&[
            Event::Voices(1),
            Event::Preference {
                name: DISPLAY_TEMPOS.to_string(),
                enabled: true,
            },
            Event::Preference {
                name: "fancynoteheads".to_string(),
                enabled: true,
            },
            Event::Note(request),
        ])
        .unwrap();
        let tempos = tempos(&actions);
        assert_eq!(tempos[0].1.as_deref(), Some("C4"));
        for (bpm, label) in &tempos[1..] {
            assert_eq!(label.as_deref(), Some(format!("{:.2} bpm", bpm).as_str()));
        }
    }

    #[test]
    fn rests_never_label_their_tempo() {
        let actions = run(&[
            Event::Voices(1),
            Event::Preference {
                name: DISPLAY_TEMPOS.to_string(),
                enabled: true,
            },
            note("A4", Rational::new(1, 8)),
            rest(Rational::new(1, 8)),
        ])
        .unwrap();
        assert_eq!(
            tempos(&actions),
            vec![(206.25, Some("A4".to_string())), (120.0, None)]
        );
    }

    #[test]
    fn rests_too_long_to_count() {
        assert_eq!(
            run(&[Event::Voices(1), rest(Rational::int(i64::MAX / 64))]),
            Err(Error::InvalidDurationFraction {
                fraction: (i64::MAX / 64).to_string()
            })
        );
    }

    #[test]
    fn invalid_settings() {
        assert_eq!(
            run(&[Event::Tempo(0.0)]),
            Err(Error::NonPositiveSetting {
                setting: "tempo",
                value: 0.0
            })
        );
        assert!(run(&[Event::Tuning(-440.0)]).is_err());
    }

    #[test]
    fn notes_too_short_to_write() {
        // a 1024th at a very low pitch takes less than half a tuplet
        let actions = run(&[
            Event::Voices(1),
            note("C0", Rational::new(1, 1024)),
            rest(Rational::new(1, 256)),
        ])
        .unwrap();
        assert_eq!(actions, vec![Action::SetMeasureLength { units: 0 }]);
    }

    #[test]
    fn invalid_notes_propagate() {
        assert_eq!(
            run(&[Event::Voices(1), note("C##4", Rational::new(1, 4))]),
            Err(Error::InvalidAlteration {
                name: "C##4".into(),
                alteration: "##".into()
            })
        );
        assert_eq!(
            run(&[Event::Voices(1), note("C4", Rational::ZERO)]),
            Err(Error::InvalidDurationFraction {
                fraction: "0".into()
            })
        );
    }
}
