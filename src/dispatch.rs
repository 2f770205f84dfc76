//! Command dispatch: one set/get/reset exchange per logical operation.
//!
//! Every operation builds a fresh [`CommandEnvelope`], issues exactly one
//! `set_query`, and decodes the status before touching the payload. Nothing
//! is retried here.

use crate::device::SessionState;
use crate::driver::{CommandEnvelope, Driver, Payload};
use crate::error::{self, check};
use crate::id::{PackedId, Target};
use crate::protocol::{self, Action};
use crate::status;
use crate::types::{
    BlockConfig, DataKind, FilterParams, Increment, OrientationUnit, PositionUnit, SourceConfig,
    StationMap, UnitConfig,
};
use crate::wire::{self, RawBlockConfig, RawSourceConfig};
use crate::{G4Error, Result};
use std::sync::MutexGuard;

/// Exclusive access to a session, obtained from [`crate::Tracker::lock`].
pub struct Dispatcher<'a, D: Driver> {
    state: MutexGuard<'a, SessionState<D>>,
    system_id: i32,
}

impl<'a, D: Driver> Dispatcher<'a, D> {
    pub(crate) fn new(state: MutexGuard<'a, SessionState<D>>, system_id: i32) -> Self {
        Self { state, system_id }
    }

    pub fn system_id(&self) -> i32 {
        self.system_id
    }

    pub(crate) fn driver(&mut self) -> &mut D {
        &mut self.state.driver
    }

    pub(crate) fn units_hint(&self) -> Option<UnitConfig> {
        self.state.units
    }

    /// Issue one raw exchange and decode its status.
    pub fn query(&mut self, envelope: &mut CommandEnvelope<'_>) -> Result<()> {
        let operation = protocol::command_name(envelope.command);
        log::debug!(
            "{} {:?} id=0x{:08x} param={}",
            operation,
            envelope.action,
            envelope.id.raw() as u32,
            envelope.param
        );
        let raw = self.state.driver.set_query(envelope);
        check(operation, status::decode(raw))
    }

    fn address(&self, command: i32, target: Target, action: Action) -> Result<PackedId> {
        let id = target.packed(self.system_id);
        if id.is_wildcard() && !action.allows_wildcard() {
            return Err(G4Error::WildcardNotAllowed {
                operation: protocol::command_name(command),
            });
        }
        Ok(id)
    }

    fn get_floats<const N: usize>(
        &mut self,
        command: i32,
        target: Target,
        param: i32,
    ) -> Result<[f32; N]> {
        let id = self.address(command, target, Action::Get)?;
        let mut values = [0.0f32; N];
        let mut envelope = CommandEnvelope::new(command, id, Action::Get)
            .with_param(param)
            .with_payload(Payload::Floats(&mut values));
        self.query(&mut envelope)?;
        Ok(values)
    }

    fn set_floats<const N: usize>(
        &mut self,
        command: i32,
        target: Target,
        param: i32,
        mut values: [f32; N],
    ) -> Result<()> {
        let id = self.address(command, target, Action::Set)?;
        let mut envelope = CommandEnvelope::new(command, id, Action::Set)
            .with_param(param)
            .with_payload(Payload::Floats(&mut values));
        self.query(&mut envelope)
    }

    fn reset(&mut self, command: i32, target: Target, param: i32) -> Result<()> {
        let id = self.address(command, target, Action::Reset)?;
        let mut envelope = CommandEnvelope::new(command, id, Action::Reset).with_param(param);
        self.query(&mut envelope)
    }

    /// Get exchange whose answer comes back in the integer parameter.
    fn get_param(&mut self, command: i32, target: Target) -> Result<i32> {
        let id = self.address(command, target, Action::Get)?;
        let mut envelope = CommandEnvelope::new(command, id, Action::Get);
        self.query(&mut envelope)?;
        Ok(envelope.param)
    }

    // -- Boresight --

    /// Reference angles currently applied to a sensor.
    pub fn boresight(&mut self, target: Target) -> Result<[f32; 4]> {
        self.get_floats(protocol::CMD_BORESIGHT, target, 0)
    }

    pub fn set_boresight(&mut self, target: Target, angles: [f32; 4]) -> Result<()> {
        self.set_floats(protocol::CMD_BORESIGHT, target, 0, angles)
    }

    pub fn reset_boresight(&mut self, target: Target) -> Result<()> {
        self.reset(protocol::CMD_BORESIGHT, target, 0)
    }

    // -- Filter --

    pub fn filter(&mut self, target: Target, kind: DataKind) -> Result<FilterParams> {
        self.get_floats(protocol::CMD_FILTER, target, kind as i32)
            .map(FilterParams::from_array)
    }

    pub fn set_filter(&mut self, target: Target, kind: DataKind, params: FilterParams) -> Result<()> {
        self.set_floats(protocol::CMD_FILTER, target, kind as i32, params.to_array())
    }

    pub fn reset_filter(&mut self, target: Target, kind: DataKind) -> Result<()> {
        self.reset(protocol::CMD_FILTER, target, kind as i32)
    }

    // -- Increment --

    pub fn increment(&mut self, target: Target) -> Result<Increment> {
        let [position, orientation] = self.get_floats(protocol::CMD_INCREMENT, target, 0)?;
        Ok(Increment {
            position,
            orientation,
        })
    }

    pub fn set_increment(&mut self, target: Target, increment: Increment) -> Result<()> {
        let values = [increment.position, increment.orientation];
        self.set_floats(protocol::CMD_INCREMENT, target, 0, values)
    }

    pub fn reset_increment(&mut self, target: Target) -> Result<()> {
        self.reset(protocol::CMD_INCREMENT, target, 0)
    }

    // -- Frame of reference --

    /// Global rotation applied to every pose of the system.
    pub fn frame_rotation(&mut self) -> Result<[f32; 4]> {
        self.get_floats(protocol::CMD_FOR_ROTATE, Target::System, 0)
    }

    pub fn set_frame_rotation(&mut self, target: Target, rotation: [f32; 4]) -> Result<()> {
        self.set_floats(protocol::CMD_FOR_ROTATE, target, 0, rotation)
    }

    pub fn reset_frame_rotation(&mut self, target: Target) -> Result<()> {
        self.reset(protocol::CMD_FOR_ROTATE, target, 0)
    }

    /// Global translation applied to every pose of the system.
    pub fn frame_translation(&mut self) -> Result<[f32; 3]> {
        self.get_floats(protocol::CMD_FOR_TRANSLATE, Target::System, 0)
    }

    pub fn set_frame_translation(&mut self, target: Target, translation: [f32; 3]) -> Result<()> {
        self.set_floats(protocol::CMD_FOR_TRANSLATE, target, 0, translation)
    }

    pub fn reset_frame_translation(&mut self, target: Target) -> Result<()> {
        self.reset(protocol::CMD_FOR_TRANSLATE, target, 0)
    }

    // -- Tip offset --

    pub fn tip_offset(&mut self, target: Target) -> Result<[f32; 3]> {
        self.get_floats(protocol::CMD_TIP_OFFSET, target, 0)
    }

    pub fn set_tip_offset(&mut self, target: Target, offset: [f32; 3]) -> Result<()> {
        self.set_floats(protocol::CMD_TIP_OFFSET, target, 0, offset)
    }

    pub fn reset_tip_offset(&mut self, target: Target) -> Result<()> {
        self.reset(protocol::CMD_TIP_OFFSET, target, 0)
    }

    // -- Units --

    fn units_exchange(&mut self, action: Action, kind: DataKind, code: &mut i32) -> Result<()> {
        let id = self.address(protocol::CMD_UNITS, Target::System, action)?;
        let mut envelope = CommandEnvelope::new(protocol::CMD_UNITS, id, action)
            .with_param(kind as i32)
            .with_payload(Payload::Int(code));
        self.query(&mut envelope)
    }

    /// Read the unit pair (orientation first, then position).
    pub fn units(&mut self) -> Result<UnitConfig> {
        let mut ori = 0;
        self.units_exchange(Action::Get, DataKind::Orientation, &mut ori)?;
        let mut pos = 0;
        self.units_exchange(Action::Get, DataKind::Position, &mut pos)?;

        let position = PositionUnit::from_code(pos).ok_or(G4Error::UnknownUnit {
            kind: DataKind::Position,
            code: pos,
        })?;
        let orientation = OrientationUnit::from_code(ori).ok_or(G4Error::UnknownUnit {
            kind: DataKind::Orientation,
            code: ori,
        })?;
        let units = UnitConfig::new(position, orientation);
        self.state.units = Some(units);
        Ok(units)
    }

    /// Apply a unit pair: orientation first, then position.
    ///
    /// If the orientation exchange fails the position exchange is not issued.
    /// If only the position exchange fails, the new orientation unit stays in
    /// effect on the device. It is recorded only when the position unit was
    /// already known; otherwise the session units stay unknown.
    pub fn set_units(&mut self, units: UnitConfig) -> Result<()> {
        let mut ori = units.orientation.code();
        self.units_exchange(Action::Set, DataKind::Orientation, &mut ori)?;

        self.state.units = self
            .state
            .units
            .map(|previous| UnitConfig::new(previous.position, units.orientation));

        let mut pos = units.position.code();
        self.units_exchange(Action::Set, DataKind::Position, &mut pos)?;
        self.state.units = Some(units);
        Ok(())
    }

    // -- Hubs and stations --

    /// Number of hubs active in the system.
    pub fn active_hub_count(&mut self) -> Result<usize> {
        let count = self.get_param(protocol::CMD_GET_ACTIVE_HUBS, Target::System)?;
        error::count("active hubs", count)
    }

    /// Ids of the active hubs: a count query, then a query sized to it.
    pub fn active_hubs(&mut self) -> Result<Vec<u32>> {
        let count = self.active_hub_count()?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let id = self.address(protocol::CMD_GET_ACTIVE_HUBS, Target::System, Action::Get)?;
        let mut hubs = vec![0i32; count];
        let mut envelope = CommandEnvelope::new(protocol::CMD_GET_ACTIVE_HUBS, id, Action::Get)
            .with_param(count as i32)
            .with_payload(Payload::Ints(&mut hubs));
        self.query(&mut envelope)?;

        let written = error::count("active hubs", envelope.param)?.min(count);
        hubs.truncate(written);
        Ok(hubs.into_iter().map(|h| h as u32).collect())
    }

    /// Sensor slots of `hub` currently reporting data.
    pub fn station_map(&mut self, hub: u32) -> Result<StationMap> {
        let bits = self.get_param(protocol::CMD_GET_STATION_MAP, Target::Hub(hub))?;
        Ok(StationMap::from_bits_truncate(bits as u32))
    }

    // -- Sources --

    /// Number of source entries the driver reports.
    pub fn max_sources(&mut self) -> Result<usize> {
        let count = self.get_param(protocol::CMD_GET_MAX_SOURCES, Target::System)?;
        error::count("max sources", count)
    }

    /// Configuration of every source, poses expressed in `units`.
    pub fn source_map(&mut self, units: UnitConfig) -> Result<Vec<SourceConfig>> {
        let count = self.max_sources()?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let id = self.address(protocol::CMD_GET_SOURCE_MAP, Target::System, Action::Get)?;
        let mut sources = vec![RawSourceConfig::default(); count];
        let mut envelope = CommandEnvelope::new(protocol::CMD_GET_SOURCE_MAP, id, Action::Get)
            .with_param(protocol::pack_units(units))
            .with_payload(Payload::Sources(&mut sources));
        self.query(&mut envelope)?;

        Ok(sources.iter().map(SourceConfig::from).collect())
    }

    // -- Block configuration --

    /// Read all settings of a hub in one exchange, poses in `units`.
    pub fn block_config(&mut self, target: Target, units: UnitConfig) -> Result<BlockConfig> {
        let id = self.address(protocol::CMD_BLOCK_CONFIG, target, Action::Get)?;
        let mut raw = RawBlockConfig::default();
        let mut envelope = CommandEnvelope::new(protocol::CMD_BLOCK_CONFIG, id, Action::Get)
            .with_param(protocol::pack_units(units))
            .with_payload(Payload::Block(&mut raw));
        self.query(&mut envelope)?;
        Ok(wire::decode_block_config(&raw, units))
    }

    /// Write all settings in one exchange. Poses are read in `config.units`.
    pub fn set_block_config(&mut self, target: Target, config: &BlockConfig) -> Result<()> {
        let id = self.address(protocol::CMD_BLOCK_CONFIG, target, Action::Set)?;
        let mut raw = wire::encode_block_config(config);
        let mut envelope = CommandEnvelope::new(protocol::CMD_BLOCK_CONFIG, id, Action::Set)
            .with_param(protocol::pack_units(config.units))
            .with_payload(Payload::Block(&mut raw));
        self.query(&mut envelope)
    }

    /// Restore the driver's default configuration.
    pub fn restore_defaults(&mut self, target: Target) -> Result<()> {
        let id = self.address(protocol::CMD_RESTORE_DEFAULT_CONFIG, target, Action::Set)?;
        let mut envelope = CommandEnvelope::new(protocol::CMD_RESTORE_DEFAULT_CONFIG, id, Action::Set);
        self.query(&mut envelope)
    }
}
