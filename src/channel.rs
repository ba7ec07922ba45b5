use crate::error::ChannelError;

/// How a channel's input is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputConfiguration {
    /// Measured against ground.
    SingleEnded,
    /// Measured against the paired input (`CH0+/CH1-`, `CH1+/CH0-`, ...).
    Differential,
}

/// One of the eight inputs of an MCP3008.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Channel {
    id: u8,
    input: InputConfiguration,
}

impl Channel {
    /// Number of inputs on the converter.
    pub const COUNT: u8 = 8;

    /// All single-ended channels, indexed by id.
    pub const SINGLE: [Channel; 8] = [
        Channel::single(0),
        Channel::single(1),
        Channel::single(2),
        Channel::single(3),
        Channel::single(4),
        Channel::single(5),
        Channel::single(6),
        Channel::single(7),
    ];

    /// All differential channels, indexed by id.
    pub const DIFFERENTIAL: [Channel; 8] = [
        Channel::differential(0),
        Channel::differential(1),
        Channel::differential(2),
        Channel::differential(3),
        Channel::differential(4),
        Channel::differential(5),
        Channel::differential(6),
        Channel::differential(7),
    ];

    /// Returns the channel with the given `id`, which must be in `0..=7`.
    ///
    /// # Examples
    ///
    /// ```
    /// use adc_calibrator::{Channel, ChannelError, InputConfiguration};
    ///
    /// let channel = Channel::new(2, InputConfiguration::SingleEnded).unwrap();
    /// assert_eq!(channel, Channel::SINGLE[2]);
    ///
    /// assert_eq!(
    ///     Channel::new(8, InputConfiguration::SingleEnded),
    ///     Err(ChannelError::InvalidId(8))
    /// );
    /// ```
    pub fn new(id: u8, input: InputConfiguration) -> Result<Self, ChannelError> {
        if id >= Self::COUNT {
            return Err(ChannelError::InvalidId(id));
        }

        Ok(Self { id, input })
    }

    const fn single(id: u8) -> Self {
        Self {
            id,
            input: InputConfiguration::SingleEnded,
        }
    }

    const fn differential(id: u8) -> Self {
        Self {
            id,
            input: InputConfiguration::Differential,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn input(&self) -> InputConfiguration {
        self.input
    }

    /// The second byte of an MCP3008 conversion request: the
    /// single/differential bit followed by the three channel select
    /// bits, in the high nibble.
    pub fn command(&self) -> u8 {
        let single = match self.input {
            InputConfiguration::SingleEnded => 1,
            InputConfiguration::Differential => 0,
        };

        ((single << 3) | self.id) << 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_ids() {
        assert!(Channel::new(7, InputConfiguration::Differential).is_ok());
        assert_eq!(
            Channel::new(8, InputConfiguration::Differential),
            Err(ChannelError::InvalidId(8))
        );
    }

    #[test]
    fn catalogue_matches_ids() {
        for (index, channel) in Channel::SINGLE.iter().enumerate() {
            assert_eq!(channel.id() as usize, index);
            assert_eq!(channel.input(), InputConfiguration::SingleEnded);
        }

        for (index, channel) in Channel::DIFFERENTIAL.iter().enumerate() {
            assert_eq!(channel.id() as usize, index);
            assert_eq!(channel.input(), InputConfiguration::Differential);
        }
    }

    #[test]
    fn command() {
        assert_eq!(Channel::SINGLE[0].command(), 0b1000_0000);
        assert_eq!(Channel::SINGLE[5].command(), 0b1101_0000);
        assert_eq!(Channel::DIFFERENTIAL[0].command(), 0b0000_0000);
        assert_eq!(Channel::DIFFERENTIAL[3].command(), 0b0011_0000);
    }
}
