//! Mapping lines shared by unit tests.

/// Twelve branches, seven leaves, single site
pub const SINGLE_12: &str = "(((A_A:0.1:C:0.5:C,B_A:0.4:C:0.3:C)_C:0.7:G:0.3:G,(C_A:0.3:A:0.1:T:0.1:T,D_T:0.5:T)_T:0.8:T:0.2:G:0.3:G)_G:0.8:G,((E_C:0.4:C,F_C:0.7:C)_C:0.7:C,G_A:0.4:C:0.6:C)_C:0.9:G:0.3:G)_G;";

/// Three consecutive sites of one primate alignment, unrooted with bushbaby as outgroup
pub const GTR_322: &str = "(((human_A:0.101652:A,orangutan_A:0.175401:A)_A:0.649724:A,(rhesus_G:0.00557255:G:0.314872:A,baboon_G:0.136734:G:0.279524:A)_A:0.27683:A)_A:1.42672:A:0.197287:T:0.302921:A:0.677233:T:0.683041:C:0.366039:G:0.300407:A:1.29285:T,marmoset_C:0.0890465:C:1.71246:A:0.0718244:G:0.685267:A:2.21303:T,bushbaby_G:0.146267:G:1.23497:T:0.433369:C:0.174881:G:1.14392:T:0.192338:C:0.350913:G:0.364961:A:0.508608:C:1.1939:G:1.20611:T:0.687221:G:0.548099:T)_T;";

pub const GTR_323: &str = "(((human_G:0.101652:G,orangutan_G:0.175401:G)_G:0.649724:G,(rhesus_G:0.320445:G,baboon_G:0.416258:G)_G:0.27683:G)_G:5.24651:G,marmoset_C:3.52904:C:0.295141:T:0.947449:G,bushbaby_G:8.18555:G)_G;";

pub const GTR_324: &str = "(((human_G:0.101652:G,orangutan_G:0.175401:G)_G:0.649724:G,(rhesus_G:0.320445:G,baboon_G:0.416258:G)_G:0.27683:G)_G:5.24651:G,marmoset_T:2.89905:T:0.630191:C:1.24239:G,bushbaby_G:8.18555:G)_G;";
