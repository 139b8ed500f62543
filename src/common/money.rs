// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

/// Dinheiro sempre com 2 casas decimais.
pub const DECIMAL_PLACES: u32 = 2;

/// Arredonda um valor monetário para 2 casas (half-up).
pub fn scale(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Zero canônico com 2 casas. `round_dp_with_strategy` nunca aumenta a
/// escala de um valor, então o zero precisa ser construído já com escala 2.
pub fn zero() -> Decimal {
    Decimal::new(0, DECIMAL_PLACES)
}

/// Subtotal de uma linha: preço unitário x quantidade, arredondado uma única
/// vez no final para não acumular desvio de arredondamento.
pub fn line_subtotal(unit_price: Decimal, quantity: i32) -> Decimal {
    scale(unit_price * Decimal::from(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn scale_rounds_half_up() {
        assert_eq!(scale(dec!(10.005)), dec!(10.01));
        assert_eq!(scale(dec!(10.004)), dec!(10.00));
        assert_eq!(scale(dec!(10.995)), dec!(11.00));
    }

    #[test]
    fn zero_has_two_places() {
        assert_eq!(zero(), dec!(0.00));
        assert_eq!(zero().scale(), 2);
    }

    #[test]
    fn line_subtotal_rounds_once_at_the_end() {
        assert_eq!(line_subtotal(dec!(33.335), 3), dec!(100.01));
        assert_eq!(line_subtotal(dec!(50.00), 2), dec!(100.00));
    }
}
